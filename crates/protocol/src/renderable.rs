use serde::{Deserialize, Serialize};

use crate::drawing::Drawing;
use crate::ident::Ident;
use crate::types::{Point, Rect};

/// What to draw for one layer in one frame.
///
/// `F` is the application's feature payload attached to batch points so
/// hit-testing can hand the clicked feature back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Renderable<F = ()> {
    /// A vector drawing rendered as-is.
    Drawing(Drawing),

    /// Large content that is skipped unless `bounds` meets the visible range.
    BigDrawing { drawing: Drawing, bounds: Rect },

    /// Glyphs rendered once and blitted at each point.
    DrawingBatch(Vec<GlyphBatch<F>>),

    /// Text labels subject to placement and overlap removal.
    Labels(Vec<Label>),
}

impl<F> Renderable<F> {
    pub fn kind(&self) -> &'static str {
        match self {
            Renderable::Drawing(_) => "drawing",
            Renderable::BigDrawing { .. } => "big-drawing",
            Renderable::DrawingBatch(_) => "drawing-batch",
            Renderable::Labels(_) => "labels",
        }
    }
}

/// One glyph drawing and the points it is stamped at.
///
/// The glyph is authored around the origin: `(0, 0)` lands on each point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphBatch<F = ()> {
    pub glyph: Drawing,
    pub points: Vec<GlyphPoint<F>>,
}

impl<F> GlyphBatch<F> {
    pub fn new(glyph: Drawing) -> Self {
        Self {
            glyph,
            points: Vec::new(),
        }
    }

    pub fn push(&mut self, at: Point, feature: F) {
        self.points.push(GlyphPoint { at, feature });
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphPoint<F = ()> {
    pub at: Point,
    pub feature: F,
}

/// Horizontal placement of a label's box relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gravity {
    /// Box extends to the left of the anchor.
    Left,
    Center,
    /// Box extends to the right of the anchor.
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: Ident,
    pub anchor: Point,
    pub gravity: Gravity,
}

impl Label {
    pub fn new(text: impl Into<Ident>, anchor: Point, gravity: Gravity) -> Self {
        Self {
            text: text.into(),
            anchor,
            gravity,
        }
    }
}
