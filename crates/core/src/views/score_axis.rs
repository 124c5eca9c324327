use genoview_protocol::{Drawing, Point, TextAlign, ThemeToken};

use crate::config::GwasConfig;
use crate::slot::{Side, TrackDimensions};
use crate::views::gwas::score_y;

const TICK_WIDTH: f64 = 3.0;
const LABEL_GAP: f64 = 1.0;
const FONT_SIZE: f64 = 10.0;
/// Roughly one labelled tick per this many pixels of axis.
const MIN_TICK_SPACING_PX: f64 = 4.0;

/// Render the -log10(p) axis into the left strip of a track, with a marker
/// at the significance threshold.
///
/// Depends only on the track dimensions, so it is computed once per canvas
/// size.
pub fn render_score_axis(dims: &TrackDimensions, config: &GwasConfig) -> Drawing {
    let strip = dims.strip(Side::Left);
    if strip.is_empty() || config.max_score <= 0.0 {
        return Drawing::empty();
    }

    let x = strip.right() - 1.0;
    let mut d = Drawing::line(
        Point::new(x, strip.y),
        Point::new(x, strip.bottom()),
        ThemeToken::AxisLine,
        1.0,
    );

    let step = nice_step(config.max_score, strip.h);
    let mut t = 0.0;
    while t <= config.max_score + step * 1e-6 {
        let y = strip.y + score_y(t, strip.h, config);
        d.push(Drawing::line(
            Point::new(x - TICK_WIDTH, y),
            Point::new(x, y),
            ThemeToken::AxisTick,
            1.0,
        ));
        d.push(Drawing::text(
            Point::new(x - TICK_WIDTH - LABEL_GAP, y),
            format_score(t, step),
            ThemeToken::AxisText,
            FONT_SIZE,
            TextAlign::Right,
        ));
        t += step;
    }

    let y = strip.y + score_y(config.significance, strip.h, config);
    d.push(Drawing::line(
        Point::new(strip.x, y),
        Point::new(x, y),
        ThemeToken::SignificanceLine,
        1.0,
    ));
    d
}

/// Choose a 1/2/5 step so ticks are at least `MIN_TICK_SPACING_PX` apart.
fn nice_step(max_score: f64, height_px: f64) -> f64 {
    let target_count = (height_px / MIN_TICK_SPACING_PX).max(1.0);
    let raw = max_score / target_count;
    let magnitude = 10.0_f64.powf(raw.log10().floor());
    for m in [1.0, 2.0, 5.0, 10.0] {
        if m * magnitude >= raw {
            return m * magnitude;
        }
    }
    10.0 * magnitude
}

fn format_score(v: f64, step: f64) -> String {
    if step >= 1.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genoview_protocol::{Padding, RenderCommand, Size};

    fn dims() -> TrackDimensions {
        TrackDimensions::new(Size::new(100.0, 44.0), Padding::new(6.0, 0.0, 2.0, 2.0))
    }

    fn config() -> GwasConfig {
        GwasConfig {
            significance: 7.3,
            glyph_radius: 1.0,
            max_score: 10.0,
            label_top_n: 5,
        }
    }

    #[test]
    fn nice_step_selects_reasonable_value() {
        assert_eq!(nice_step(10.0, 40.0), 1.0);
        assert_eq!(nice_step(10.0, 12.0), 5.0);
        assert_eq!(nice_step(12.0, 40.0), 2.0);
        assert!((nice_step(1.0, 40.0) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn renders_ticks_labels_and_threshold() {
        let d = render_score_axis(&dims(), &config());
        let texts: Vec<&str> = d
            .commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts.len(), 11);
        assert_eq!(texts[0], "0");
        assert_eq!(texts[10], "10");

        let threshold = d
            .commands()
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawLine { color: ThemeToken::SignificanceLine, .. }))
            .count();
        assert_eq!(threshold, 1);
    }

    #[test]
    fn ticks_stay_in_the_left_strip() {
        let d = render_score_axis(&dims(), &config());
        for c in d.commands() {
            if let RenderCommand::DrawLine { from, to, .. } = c {
                assert!(from.x <= 6.0 && to.x <= 6.0);
                assert!(from.y >= 2.0 && to.y <= 42.0);
            }
        }
    }

    #[test]
    fn no_left_padding_no_axis() {
        let dims = TrackDimensions::new(Size::new(100.0, 44.0), Padding::uniform(0.0));
        assert!(render_score_axis(&dims, &config()).is_empty());
    }

    #[test]
    fn format_labels() {
        assert_eq!(format_score(5.0, 1.0), "5");
        assert_eq!(format_score(0.5, 0.1), "0.5");
    }
}
