//! How a track's canvas area splits into slots.
//!
//! ```text
//! +-----------------------------+
//! |            top              |
//! +------+--------------+-------+
//! | left |    padded    | right |
//! +------+--------------+-------+
//! |           bottom            |
//! +-----------------------------+
//! ```
//!
//! The padded center holds scrolling track content. The four strips around
//! it make up the `Outside` slot, where fixed UI such as axes is drawn.

use genoview_protocol::{Padding, Point, Rect, Size};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackDimensions {
    pub size: Size,
    pub padding: Padding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerType {
    /// Drawn at a fixed position. Never scrolls.
    Fixed,
    /// Pans and zooms with the view. Backed by a buffered canvas.
    Scrolling,
}

/// Where a layer sits inside the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Component {
    Full,
    Padded,
    Outside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// Region a surface may draw into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clip {
    Rect(Rect),
    /// Everything in `outer` except `hole`.
    Frame { outer: Rect, hole: Rect },
}

impl Clip {
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Clip::Rect(r) => r.contains(p),
            Clip::Frame { outer, hole } => outer.contains(p) && !hole.contains(p),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Clip::Rect(r) => *r,
            Clip::Frame { outer, .. } => *outer,
        }
    }
}

/// Translation and clip a layer's surface uses for its component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub offset: Point,
    pub clip: Option<Clip>,
    /// Size the application draws into.
    pub slot: Size,
}

impl TrackDimensions {
    pub fn new(size: Size, padding: Padding) -> Self {
        Self { size, padding }
    }

    pub fn full(&self) -> Rect {
        Rect::from_size(self.size)
    }

    pub fn padded(&self) -> Rect {
        self.full().inset(self.padding)
    }

    pub fn strip(&self, side: Side) -> Rect {
        let full = self.full();
        let center = self.padded();
        match side {
            Side::Top => Rect::new(0.0, 0.0, full.w, center.y),
            Side::Bottom => Rect::new(0.0, center.bottom(), full.w, full.h - center.bottom()),
            Side::Left => Rect::new(0.0, center.y, center.x, center.h),
            Side::Right => Rect::new(center.right(), center.y, full.w - center.right(), center.h),
        }
    }

    pub fn placement(&self, component: Component) -> Placement {
        match component {
            Component::Full => Placement {
                offset: Point::new(0.0, 0.0),
                clip: None,
                slot: self.size,
            },
            Component::Padded => {
                let center = self.padded();
                Placement {
                    offset: center.origin(),
                    clip: Some(Clip::Rect(center)),
                    slot: center.size(),
                }
            }
            Component::Outside => Placement {
                offset: Point::new(0.0, 0.0),
                clip: Some(Clip::Frame {
                    outer: self.full(),
                    hole: self.padded(),
                }),
                slot: self.size,
            },
        }
    }

    /// Container-relative `p` in the coordinates of `component`'s slot.
    pub fn to_slot(&self, component: Component, p: Point) -> Point {
        let offset = self.placement(component).offset;
        Point::new(p.x - offset.x, p.y - offset.y)
    }
}
