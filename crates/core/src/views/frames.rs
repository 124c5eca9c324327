use genoview_protocol::{Drawing, Gravity, Label, Point, Rect, Renderable, Size, ThemeToken};

use crate::coords::CoordSys;
use crate::scale::LinearScale;

/// Segment names sit this far above the bottom of the slot.
const LABEL_OFFSET_Y: f64 = 2.0;

/// Render chromosome frames: one alternating band per segment, bordered,
/// plus a centered name label.
///
/// Positions are in content pixels, so the result stays valid while the view
/// pans at a fixed width.
pub fn render_frames<F>(coords: &CoordSys, scale: &LinearScale, slot: Size) -> Vec<Renderable<F>> {
    if coords.is_empty() || slot.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(coords.len() + 1);
    let mut labels = Vec::with_capacity(coords.len());

    for (i, segment) in coords.segments().iter().enumerate() {
        let Some(range) = coords.segment_range(&segment.id) else {
            continue;
        };
        let px = scale.content_range(range.to_f64());
        let bounds = Rect::new(px.low, 0.0, px.size(), slot.height);
        let band = if i % 2 == 0 {
            ThemeToken::SegmentBandEven
        } else {
            ThemeToken::SegmentBandOdd
        };
        out.push(Renderable::BigDrawing {
            drawing: Drawing::rect(bounds, band, Some(ThemeToken::SegmentBorder)),
            bounds,
        });
        labels.push(Label::new(
            segment.id.clone(),
            Point::new(px.center(), slot.height - LABEL_OFFSET_Y),
            Gravity::Center,
        ));
    }

    out.push(Renderable::Labels(labels));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use genoview_protocol::Interval;

    fn coords() -> CoordSys {
        CoordSys::build([("1", 1000), ("2", 500)], 10).unwrap()
    }

    #[test]
    fn one_band_per_segment_in_content_pixels() {
        let scale = LinearScale::for_view(151.0, Interval::new(0.0, 1510.0)).unwrap();
        let out: Vec<Renderable> = render_frames(&coords(), &scale, Size::new(151.0, 20.0));
        assert_eq!(out.len(), 3);
        let Renderable::BigDrawing { bounds, .. } = &out[1] else {
            unreachable!("second item is the band of segment 2");
        };
        assert_eq!((bounds.x, bounds.w, bounds.h), (101.0, 50.0, 20.0));
    }

    #[test]
    fn bands_alternate_and_labels_are_centered() {
        let scale = LinearScale::for_view(151.0, Interval::new(0.0, 1510.0)).unwrap();
        let out: Vec<Renderable> = render_frames(&coords(), &scale, Size::new(151.0, 20.0));
        let colors: Vec<ThemeToken> = out
            .iter()
            .filter_map(|r| match r {
                Renderable::BigDrawing { drawing, .. } => match drawing.commands().first() {
                    Some(genoview_protocol::RenderCommand::DrawRect { color, .. }) => Some(*color),
                    _ => None,
                },
                _ => None,
            })
            .collect();
        assert_eq!(colors, [ThemeToken::SegmentBandEven, ThemeToken::SegmentBandOdd]);

        let Some(Renderable::Labels(labels)) = out.last() else {
            unreachable!("labels come last");
        };
        assert_eq!(labels[0].text, "1");
        assert_eq!(labels[0].anchor.x, 50.0);
        assert_eq!(labels[1].gravity, Gravity::Center);
    }

    #[test]
    fn panning_does_not_move_content() {
        let a = LinearScale::for_view(100.0, Interval::new(0.0, 500.0)).unwrap();
        let b = LinearScale::for_view(100.0, Interval::new(700.0, 1200.0)).unwrap();
        let slot = Size::new(100.0, 10.0);
        let ra: Vec<Renderable> = render_frames(&coords(), &a, slot);
        let rb: Vec<Renderable> = render_frames(&coords(), &b, slot);
        assert_eq!(ra, rb);
    }

    #[test]
    fn empty_slot_renders_nothing() {
        let scale = LinearScale::for_view(0.0, Interval::new(0.0, 1510.0)).unwrap();
        let out: Vec<Renderable> = render_frames(&coords(), &scale, Size::new(0.0, 0.0));
        assert!(out.is_empty());
    }
}
