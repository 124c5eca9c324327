use genoview_protocol::{
    Drawing, GlyphBatch, Gravity, Interval, Label, Point, Renderable, Size, ThemeToken,
};
use serde::{Deserialize, Serialize};

use crate::config::GwasConfig;
use crate::features::{Feature, FeatureSet};
use crate::scale::LinearScale;

/// A payload that can be plotted on the association scatter.
pub trait Scored {
    /// Association strength as -log10(p).
    fn score(&self) -> f64;
    fn name(&self) -> &str;
}

/// One tested variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snp {
    pub rsid: String,
    /// -log10(p).
    pub score: f64,
}

impl Scored for Snp {
    fn score(&self) -> f64 {
        self.score
    }

    fn name(&self) -> &str {
        &self.rsid
    }
}

/// Vertical position of `score` in a slot `height` tall.
pub fn score_y(score: f64, height: f64, config: &GwasConfig) -> f64 {
    if config.max_score <= 0.0 || !score.is_finite() {
        return height;
    }
    let clamped = score.clamp(0.0, config.max_score);
    height - clamped / config.max_score * height
}

/// Render a GWAS scatter.
///
/// Every feature becomes a glyph point carrying the feature itself, so hit
/// tests hand back what was clicked. Points at or above the significance
/// threshold use a separate glyph. The strongest `label_top_n` hits get
/// label candidates, strongest first. The threshold line spans the global
/// `extent` of the axis.
pub fn render_gwas<P>(
    features: &FeatureSet<P>,
    extent: Interval<f64>,
    scale: &LinearScale,
    slot: Size,
    config: &GwasConfig,
) -> Vec<Renderable<Feature<P>>>
where
    P: Scored + Clone,
{
    if slot.is_empty() {
        return Vec::new();
    }

    let span = scale.content_range(extent);
    let threshold = score_y(config.significance, slot.height, config);
    let line = Drawing::line(
        Point::new(span.low, threshold),
        Point::new(span.high, threshold),
        ThemeToken::SignificanceLine,
        1.0,
    );
    if features.is_empty() {
        return vec![Renderable::Drawing(line)];
    }

    let r = config.glyph_radius;
    let mut normal = GlyphBatch::new(Drawing::circle(Point::default(), r, ThemeToken::SnpPoint));
    let mut significant = GlyphBatch::new(Drawing::circle(Point::default(), r, ThemeToken::SnpSignificant));
    let mut ranked: Vec<(f64, Point, &str)> = Vec::new();

    for f in features.iter() {
        let score = f.payload.score();
        let at = Point::new(scale.content_px(f.position as f64), score_y(score, slot.height, config));
        if score >= config.significance {
            significant.push(at, f.clone());
        } else {
            normal.push(at, f.clone());
        }
        if score.is_finite() {
            ranked.push((score, at, f.payload.name()));
        }
    }

    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    let labels = ranked
        .into_iter()
        .take(config.label_top_n)
        .map(|(_, at, name)| Label::new(name, Point::new(at.x, at.y - r), Gravity::Right))
        .collect();

    let mut batches = Vec::with_capacity(2);
    for batch in [normal, significant] {
        if !batch.points.is_empty() {
            batches.push(batch);
        }
    }

    vec![
        Renderable::Drawing(line),
        Renderable::DrawingBatch(batches),
        Renderable::Labels(labels),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::CoordSys;
    use crate::features::{Extras, FeatureRecord};
    use genoview_protocol::RenderCommand;

    fn snp(offset: u64, rsid: &str, score: f64) -> FeatureRecord<Snp> {
        FeatureRecord {
            segment: "1".into(),
            offset,
            payload: Snp {
                rsid: rsid.to_string(),
                score,
            },
            extra: Extras::new(),
        }
    }

    fn config() -> GwasConfig {
        GwasConfig {
            significance: 7.3,
            glyph_radius: 1.0,
            max_score: 10.0,
            label_top_n: 2,
        }
    }

    fn render(records: Vec<FeatureRecord<Snp>>) -> Vec<Renderable<Feature<Snp>>> {
        let coords = CoordSys::build([("1", 1000)], 0).unwrap();
        let (set, _) = FeatureSet::build(&coords, records);
        let scale = LinearScale::for_view(100.0, Interval::new(0.0, 1000.0)).unwrap();
        render_gwas(&set, coords.full_view(), &scale, Size::new(100.0, 50.0), &config())
    }

    #[test]
    fn score_maps_to_height() {
        let c = config();
        assert_eq!(score_y(0.0, 50.0, &c), 50.0);
        assert_eq!(score_y(5.0, 50.0, &c), 25.0);
        assert_eq!(score_y(40.0, 50.0, &c), 0.0);
        assert_eq!(score_y(f64::NAN, 50.0, &c), 50.0);
    }

    #[test]
    fn significant_hits_use_their_own_glyph() {
        let out = render(vec![snp(100, "rs1", 2.0), snp(500, "rs2", 9.0), snp(900, "rs3", 3.0)]);
        let Renderable::DrawingBatch(batches) = &out[1] else {
            unreachable!("points follow the threshold line");
        };
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].points.len(), 2);
        assert_eq!(batches[1].points[0].feature.payload.rsid, "rs2");
        assert_eq!(batches[1].points[0].at, Point::new(50.0, 5.0));
    }

    #[test]
    fn strongest_hits_are_labelled_first() {
        let out = render(vec![snp(100, "rs1", 2.0), snp(500, "rs2", 9.0), snp(900, "rs3", 3.0)]);
        let Renderable::Labels(labels) = &out[2] else {
            unreachable!("labels come last");
        };
        let names: Vec<&str> = labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(names, ["rs2", "rs3"]);
    }

    #[test]
    fn threshold_line_spans_the_axis() {
        let out = render(Vec::new());
        assert_eq!(out.len(), 1);
        let Renderable::Drawing(line) = &out[0] else {
            unreachable!("only the threshold line");
        };
        let Some(RenderCommand::DrawLine { from, to, color, .. }) = line.commands().first() else {
            unreachable!("a single line");
        };
        assert_eq!((from.x, to.x), (0.0, 100.0));
        assert_eq!(from.y, score_y(7.3, 50.0, &config()));
        assert_eq!(*color, ThemeToken::SignificanceLine);
    }
}
