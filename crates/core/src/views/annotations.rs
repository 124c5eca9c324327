use genoview_protocol::{Drawing, Gravity, Label, Point, Rect, Renderable, Size, ThemeToken};
use serde::{Deserialize, Serialize};

use crate::features::FeatureSet;
use crate::scale::LinearScale;

const ROW_HEIGHT: f64 = 4.0;
/// Annotations narrower than this are widened so they stay visible.
const MIN_WIDTH_PX: f64 = 1.0;

/// A named region such as a gene. Its feature position is the start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    pub length: u64,
}

/// Render annotation glyphs as boxes on a single row in the middle of the
/// slot, each culled on its own when off screen, with names to their left.
pub fn render_annotations<F>(
    annotations: &FeatureSet<Annotation>,
    scale: &LinearScale,
    slot: Size,
) -> Vec<Renderable<F>> {
    if annotations.is_empty() || slot.is_empty() {
        return Vec::new();
    }

    let y = ((slot.height - ROW_HEIGHT) / 2.0).max(0.0);
    let mut out = Vec::with_capacity(annotations.len() + 1);
    let mut labels = Vec::with_capacity(annotations.len());

    for a in annotations.iter() {
        let x = scale.content_px(a.position as f64);
        let w = (a.payload.length as f64 * scale.pixels_per_unit()).max(MIN_WIDTH_PX);
        let bounds = Rect::new(x, y, w, ROW_HEIGHT.min(slot.height));
        out.push(Renderable::BigDrawing {
            drawing: Drawing::rect(bounds, ThemeToken::GeneFill, Some(ThemeToken::GeneBorder)),
            bounds,
        });
        labels.push(Label::new(
            a.payload.name.as_str(),
            Point::new(x, y + bounds.h / 2.0),
            Gravity::Left,
        ));
    }

    out.push(Renderable::Labels(labels));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::CoordSys;
    use crate::features::{Extras, FeatureRecord};
    use genoview_protocol::Interval;

    fn gene(segment: &str, offset: u64, name: &str, length: u64) -> FeatureRecord<Annotation> {
        FeatureRecord {
            segment: segment.into(),
            offset,
            payload: Annotation {
                name: name.to_string(),
                length,
            },
            extra: Extras::new(),
        }
    }

    fn render(width_units: f64) -> Vec<Renderable> {
        let coords = CoordSys::build([("1", 1000), ("2", 500)], 10).unwrap();
        let (set, _) = FeatureSet::build(&coords, [gene("1", 100, "BRCA2", 200), gene("2", 0, "TP53", 1)]);
        let scale = LinearScale::for_view(100.0, Interval::new(0.0, width_units)).unwrap();
        render_annotations(&set, &scale, Size::new(100.0, 10.0))
    }

    #[test]
    fn boxes_follow_scale() {
        let out = render(1000.0);
        let Renderable::BigDrawing { bounds, .. } = &out[0] else {
            unreachable!("first annotation box");
        };
        assert_eq!((bounds.x, bounds.y, bounds.w, bounds.h), (10.0, 3.0, 20.0, 4.0));
        let Renderable::BigDrawing { bounds, .. } = &out[1] else {
            unreachable!("second annotation box");
        };
        assert_eq!((bounds.x, bounds.w), (101.0, MIN_WIDTH_PX));
    }

    #[test]
    fn labels_hang_left_of_the_start() {
        let out = render(1000.0);
        let Some(Renderable::Labels(labels)) = out.last() else {
            unreachable!("labels come last");
        };
        assert_eq!(labels[0].text, "BRCA2");
        assert_eq!(labels[0].gravity, Gravity::Left);
        assert_eq!(labels[0].anchor, Point::new(10.0, 5.0));
    }
}
