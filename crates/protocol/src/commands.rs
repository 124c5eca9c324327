use serde::{Deserialize, Serialize};

use crate::ident::Ident;
use crate::theme::ThemeToken;
use crate::types::{Point, Rect};

/// A single, stateless vector instruction.
///
/// A [`Drawing`](crate::Drawing) is an ordered list of these; surfaces
/// consume them sequentially and each carries all the data it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Filled rectangle with an optional border.
    DrawRect {
        rect: Rect,
        color: ThemeToken,
        border_color: Option<ThemeToken>,
    },

    /// Filled circle.
    DrawCircle {
        center: Point,
        radius: f64,
        color: ThemeToken,
    },

    /// Text anchored at `position` according to `align`.
    DrawText {
        position: Point,
        text: Ident,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
    },

    DrawLine {
        from: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
    },

    /// Open polyline through `points`.
    DrawPath {
        points: Vec<Point>,
        color: ThemeToken,
        width: f64,
    },

    /// Restrict subsequent drawing to a rectangular region.
    SetClip { rect: Rect },

    /// Remove the active clip region.
    ClearClip,

    /// Push a translation (applied to all subsequent commands until the
    /// matching `PopTransform`).
    PushTransform { translate: Point },

    PopTransform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}
