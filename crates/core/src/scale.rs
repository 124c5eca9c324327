use genoview_protocol::Interval;

use crate::error::ViewError;
use crate::view::View;

/// Linear map between a view on the global axis and a canvas row of pixels.
///
/// Besides the view-relative mapping, the scale exposes a *content* space
/// anchored at global 0: `content_px(g) = g * pixels_per_unit`. Content
/// coordinates depend only on the view width, so anything positioned in
/// them can be reused while the view pans and shifted by
/// `-visible_pixels().low` when drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    view: View,
    width: f64,
}

impl LinearScale {
    pub fn for_view(width_px: f64, view: View) -> Result<Self, ViewError> {
        let span = view.size();
        if !span.is_finite() || span <= 0.0 {
            return Err(ViewError::Degenerate {
                low: view.low,
                high: view.high,
            });
        }
        Ok(Self {
            view,
            width: width_px.max(0.0),
        })
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn pixels_per_unit(&self) -> f64 {
        self.width / self.view.size()
    }

    /// Pixel offset of `global` from the left edge of the canvas.
    pub fn to_pixel(&self, global: f64) -> f64 {
        (global - self.view.low) / self.view.size() * self.width
    }

    /// Global coordinate under pixel `px`.
    pub fn to_global(&self, px: f64) -> f64 {
        if self.width == 0.0 {
            return self.view.low;
        }
        self.view.low + (px / self.width) * self.view.size()
    }

    pub fn content_px(&self, global: f64) -> f64 {
        global * self.pixels_per_unit()
    }

    /// Global extent mapped into content pixels.
    pub fn content_range(&self, global: Interval<f64>) -> Interval<f64> {
        global.scale(self.pixels_per_unit())
    }

    /// The part of content space currently on the canvas.
    pub fn visible_pixels(&self) -> Interval<f64> {
        self.content_range(self.view)
    }
}
