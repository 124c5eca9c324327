use std::sync::Arc;

use genoview_protocol::Point;

/// Glyph positions of the last drawn frame, for hit-testing clicks.
///
/// Positions are recorded in container pixels. Scroll and zoom previews
/// move the pixels on screen without redrawing, so the index keeps a
/// horizontal `x * scale + offset` correction that follows them.
#[derive(Debug, Clone)]
pub struct HotspotIndex<F> {
    points: Arc<Vec<(Point, F)>>,
    scale: f64,
    offset: f64,
}

impl<F> Default for HotspotIndex<F> {
    fn default() -> Self {
        Self {
            points: Arc::new(Vec::new()),
            scale: 1.0,
            offset: 0.0,
        }
    }
}

impl<F: Clone> HotspotIndex<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous frame.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn record(&mut self, at: Point, feature: F) {
        Arc::make_mut(&mut self.points).push((at, feature));
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Follow a preview scroll of `dx` pixels.
    pub fn scrolled(&mut self, dx: f64) {
        self.offset += dx;
    }

    /// Follow a preview zoom that stretched the `[left, right]` fractions of
    /// the horizontal range `[x, x + w]` across the whole range.
    pub fn zoomed(&mut self, left: f64, right: f64, x: f64, w: f64) {
        let span = right - left;
        if span <= 0.0 {
            return;
        }
        let src_x = x + left * w;
        self.scale /= span;
        self.offset = x + (self.offset - src_x) / span;
    }

    /// Where a recorded point is on screen now.
    pub fn current(&self, at: Point) -> Point {
        Point::new(at.x * self.scale + self.offset, at.y)
    }

    /// Features whose glyph center lies within `radius` of `point`, nearest
    /// first.
    pub fn hits(&self, radius: f64, point: Point) -> Vec<F> {
        let mut found: Vec<(f64, &F)> = self
            .points
            .iter()
            .filter_map(|(at, feature)| {
                let d = self.current(*at).distance(point);
                (d <= radius).then_some((d, feature))
            })
            .collect();
        found.sort_by(|a, b| a.0.total_cmp(&b.0));
        found.into_iter().map(|(_, f)| f.clone()).collect()
    }
}
