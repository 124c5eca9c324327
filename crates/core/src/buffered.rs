use genoview_protocol::{Rect, Size};

use crate::surface::Surface;

/// A front surface plus a same-size back surface used as scratch space for
/// re-blitting.
///
/// `scroll` and `zoom` move pixels that are already on screen. They are a
/// visual preview only: the real content at the new view arrives with the
/// next full draw.
#[derive(Debug)]
pub struct BufferedCanvas<S> {
    back: S,
    front: S,
}

impl<S: Surface> BufferedCanvas<S> {
    pub fn new(size: Size) -> Self {
        Self {
            back: S::new(size),
            front: S::new(size),
        }
    }

    pub fn front(&self) -> &S {
        &self.front
    }

    pub fn front_mut(&mut self) -> &mut S {
        &mut self.front
    }

    pub fn back(&self) -> &S {
        &self.back
    }

    pub fn size(&self) -> Size {
        self.front.size()
    }

    pub fn resize(&mut self, size: Size) {
        self.back.resize(size);
        self.front.resize(size);
    }

    fn stash_front(&mut self) {
        let all = self.front.bounds();
        self.back.clear(all);
        self.back.blit(&self.front, all, all);
        self.front.clear(all);
    }

    /// Shift the visible pixels by `dx`. Positive moves content right.
    pub fn scroll(&mut self, dx: f64) {
        if dx == 0.0 {
            return;
        }
        self.stash_front();
        let all = self.front.bounds();
        self.front.blit(&self.back, all, all.translate(dx, 0.0));
    }

    /// Stretch the `[left, right]` fractions of `region` across all of
    /// `region`.
    pub fn zoom(&mut self, left: f64, right: f64, region: Rect) {
        if left.is_nan() || right.is_nan() || left >= right || region.is_empty() {
            return;
        }
        self.stash_front();
        let src = Rect::new(region.x + left * region.w, region.y, (right - left) * region.w, region.h);
        self.front.blit(&self.back, src, region);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RasterSurface;
    use genoview_protocol::{Drawing, ThemeToken};

    fn canvas_with_block() -> BufferedCanvas<RasterSurface> {
        let mut c = BufferedCanvas::<RasterSurface>::new(Size::new(10.0, 1.0));
        c.front_mut()
            .draw(&Drawing::rect(Rect::new(2.0, 0.0, 2.0, 1.0), ThemeToken::GeneFill, None));
        c
    }

    #[test]
    fn scroll_shifts_pixels() {
        let mut c = canvas_with_block();
        c.scroll(3.0);
        assert_eq!(c.front().row_text(0), "     ██   ");
        c.scroll(-5.0);
        assert_eq!(c.front().row_text(0), "██        ");
    }

    #[test]
    fn scroll_off_the_edge_drops_pixels() {
        let mut c = canvas_with_block();
        c.scroll(20.0);
        assert_eq!(c.front().filled_cells(), 0);
    }

    #[test]
    fn zoom_stretches_fraction() {
        let mut c = canvas_with_block();
        let all = c.front().bounds();
        c.zoom(0.0, 0.5, all);
        assert_eq!(c.front().row_text(0), "    ████  ");
    }

    #[test]
    fn resize_applies_to_both_surfaces() {
        let mut c = canvas_with_block();
        c.resize(Size::new(4.0, 2.0));
        assert_eq!(c.front().size(), Size::new(4.0, 2.0));
        assert_eq!(c.back().size(), Size::new(4.0, 2.0));
        assert_eq!(c.front().filled_cells(), 0);
    }
}
