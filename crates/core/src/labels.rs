//! Greedy label placement.
//!
//! Labels are considered in input order and a label survives only if its box
//! is clear of every label kept before it. Callers sort by importance first.

use genoview_protocol::{Drawing, Gravity, Interval, Label, Point, Rect, TextAlign, ThemeToken};

use crate::config::LabelConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    pub label: Label,
    pub bbox: Rect,
}

/// Screen box of `label` for a text `width` wide.
pub fn label_box(label: &Label, width: f64, config: &LabelConfig) -> Rect {
    let shift = width / 2.0 + config.gravity_padding;
    let center_x = match label.gravity {
        Gravity::Left => label.anchor.x - shift,
        Gravity::Center => label.anchor.x,
        Gravity::Right => label.anchor.x + shift,
    };
    Rect::new(
        center_x - width / 2.0,
        label.anchor.y - config.text_height / 2.0,
        width,
        config.text_height,
    )
}

/// Keep the labels that fit.
///
/// `visible` is the horizontal pixel range on screen; labels whose box lies
/// wholly outside it (plus `visible_margin`) are dropped before the overlap
/// pass. `measure` returns the rendered width of a label's text.
pub fn place<'a, I, M>(visible: Interval<f64>, labels: I, config: &LabelConfig, measure: M) -> Vec<PlacedLabel>
where
    I: IntoIterator<Item = &'a Label>,
    M: Fn(&str) -> f64,
{
    let window = Interval::new(visible.low - config.visible_margin, visible.high + config.visible_margin);
    let mut kept: Vec<PlacedLabel> = Vec::new();
    for label in labels {
        let bbox = label_box(label, measure(label.text.as_str()), config);
        if !Interval::new(bbox.x, bbox.right()).overlaps(&window) {
            continue;
        }
        if kept.iter().any(|k| k.bbox.intersects(&bbox)) {
            continue;
        }
        kept.push(PlacedLabel {
            label: label.clone(),
            bbox,
        });
    }
    kept
}

impl PlacedLabel {
    /// Text drawn at the left edge of its box, on the anchor's row.
    pub fn to_drawing(&self, color: ThemeToken, font_size: f64) -> Drawing {
        Drawing::text(
            Point::new(self.bbox.x, self.label.anchor.y),
            self.label.text.clone(),
            color,
            font_size,
            TextAlign::Left,
        )
    }
}
