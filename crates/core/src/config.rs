//! Browser configuration.
//!
//! Every field has a default, so `{}` is a valid document. Tuning values for
//! labels and glyphs live here instead of in the drawing code.

use std::time::Duration;

use genoview_protocol::{Interval, Padding, SegmentId, Size};
use serde::{Deserialize, Serialize};

use crate::coords::CoordSys;
use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default)]
    pub genome: GenomeConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub labels: LabelConfig,
    #[serde(default)]
    pub gwas: GwasConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeConfig {
    /// Explicit segment list. Empty means "use `build`".
    #[serde(default)]
    pub segments: Vec<SegmentSpec>,

    #[serde(default)]
    pub build: GenomeBuild,

    /// Global units inserted between neighbouring segments.
    #[serde(default = "default_padding")]
    pub padding: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub id: SegmentId,
    pub size: i64,
}

/// Built-in chromosome tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenomeBuild {
    #[default]
    Grch37,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Narrowest view the update protocol allows, in global units.
    #[serde(default = "default_min_width")]
    pub min_width: f64,

    /// Coalescing window for view commands.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Starting view. `None` shows the whole genome.
    #[serde(default)]
    pub initial: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Renderables drawn between cancellation checks.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_glyph_buffer")]
    pub glyph_buffer: Size,

    /// Space around the track area reserved for fixed UI.
    #[serde(default = "default_track_padding")]
    pub track_padding: Padding,

    /// Re-blit previews tolerated before an authoritative redraw is forced.
    #[serde(default = "default_max_approximate_frames")]
    pub max_approximate_frames: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default = "default_text_height")]
    pub text_height: f64,

    /// Gap between an anchor and a left/right-gravity label box.
    #[serde(default = "default_gravity_padding")]
    pub gravity_padding: f64,

    /// Width estimate per character when a surface cannot measure text.
    #[serde(default = "default_char_width")]
    pub char_width: f64,

    /// Labels anchored this far outside the visible range still count.
    #[serde(default = "default_visible_margin")]
    pub visible_margin: f64,

    #[serde(default = "default_font_size")]
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GwasConfig {
    /// Genome-wide significance as -log10(p).
    #[serde(default = "default_significance")]
    pub significance: f64,

    #[serde(default = "default_glyph_radius")]
    pub glyph_radius: f64,

    /// Top of the score axis.
    #[serde(default = "default_max_score")]
    pub max_score: f64,

    /// How many of the strongest hits get a label candidate.
    #[serde(default = "default_label_top_n")]
    pub label_top_n: usize,
}

fn default_padding() -> u64 {
    2_500_000
}

fn default_min_width() -> f64 {
    100.0
}

fn default_debounce_ms() -> u64 {
    150
}

fn default_chunk_size() -> usize {
    250
}

fn default_glyph_buffer() -> Size {
    Size::new(32.0, 32.0)
}

fn default_track_padding() -> Padding {
    Padding::new(48.0, 8.0, 20.0, 8.0)
}

fn default_max_approximate_frames() -> u32 {
    4
}

fn default_text_height() -> f64 {
    12.0
}

fn default_gravity_padding() -> f64 {
    4.0
}

fn default_char_width() -> f64 {
    7.0
}

fn default_visible_margin() -> f64 {
    50.0
}

fn default_font_size() -> f64 {
    11.0
}

fn default_significance() -> f64 {
    7.3
}

fn default_glyph_radius() -> f64 {
    3.0
}

fn default_max_score() -> f64 {
    12.0
}

fn default_label_top_n() -> usize {
    10
}

impl Default for GenomeConfig {
    fn default() -> Self {
        Self {
            segments: Vec::new(),
            build: GenomeBuild::default(),
            padding: default_padding(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            min_width: default_min_width(),
            debounce_ms: default_debounce_ms(),
            initial: None,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            glyph_buffer: default_glyph_buffer(),
            track_padding: default_track_padding(),
            max_approximate_frames: default_max_approximate_frames(),
        }
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            text_height: default_text_height(),
            gravity_padding: default_gravity_padding(),
            char_width: default_char_width(),
            visible_margin: default_visible_margin(),
            font_size: default_font_size(),
        }
    }
}

impl Default for GwasConfig {
    fn default() -> Self {
        Self {
            significance: default_significance(),
            glyph_radius: default_glyph_radius(),
            max_score: default_max_score(),
            label_top_n: default_label_top_n(),
        }
    }
}

impl GenomeBuild {
    /// Chromosome lengths of the build, in display order.
    pub fn segments(self) -> Vec<SegmentSpec> {
        let table: &[(&str, i64)] = match self {
            GenomeBuild::Grch37 => &GRCH37,
        };
        table
            .iter()
            .map(|&(id, size)| SegmentSpec {
                id: id.into(),
                size,
            })
            .collect()
    }
}

const GRCH37: [(&str, i64); 24] = [
    ("1", 249_250_621),
    ("2", 243_199_373),
    ("3", 198_022_430),
    ("4", 191_154_276),
    ("5", 180_915_260),
    ("6", 171_115_067),
    ("7", 159_138_663),
    ("8", 146_364_022),
    ("9", 141_213_431),
    ("10", 135_534_747),
    ("11", 135_006_516),
    ("12", 133_851_895),
    ("13", 115_169_878),
    ("14", 107_349_540),
    ("15", 102_531_392),
    ("16", 90_354_753),
    ("17", 81_195_210),
    ("18", 78_077_248),
    ("19", 59_128_983),
    ("20", 63_025_520),
    ("21", 48_129_895),
    ("22", 51_304_566),
    ("X", 155_270_560),
    ("Y", 59_373_566),
];

impl BrowserConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_positive(self.view.min_width) {
            return Err(invalid("view.min_width", "must be positive"));
        }
        if let Some((low, high)) = self.view.initial
            && low.partial_cmp(&high) != Some(std::cmp::Ordering::Less)
        {
            return Err(invalid("view.initial", "low must be below high"));
        }
        if self.render.chunk_size == 0 {
            return Err(invalid("render.chunk_size", "must be at least 1"));
        }
        if self.render.glyph_buffer.is_empty() {
            return Err(invalid("render.glyph_buffer", "must have a positive area"));
        }
        let p = self.render.track_padding;
        if [p.left, p.right, p.top, p.bottom].iter().any(|v| *v < 0.0) {
            return Err(invalid("render.track_padding", "must not be negative"));
        }
        if !is_positive(self.labels.text_height) {
            return Err(invalid("labels.text_height", "must be positive"));
        }
        if !is_positive(self.gwas.max_score) {
            return Err(invalid("gwas.max_score", "must be positive"));
        }
        Ok(())
    }

    /// Explicit segments, or the preset build when none are given.
    pub fn segment_specs(&self) -> Vec<SegmentSpec> {
        if self.genome.segments.is_empty() {
            self.genome.build.segments()
        } else {
            self.genome.segments.clone()
        }
    }

    pub fn coord_sys(&self) -> Result<CoordSys, ConfigError> {
        CoordSys::build(
            self.segment_specs().into_iter().map(|s| (s.id, s.size)),
            self.genome.padding,
        )
    }

    /// The configured starting view, or the full axis.
    pub fn initial_view(&self, coords: &CoordSys) -> Interval<f64> {
        match self.view.initial {
            Some((low, high)) => Interval::new(low, high),
            None => coords.full_view(),
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.view.debounce_ms)
    }
}

fn is_positive(v: f64) -> bool {
    v > 0.0
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gets_defaults() {
        let config = BrowserConfig::from_json("{}").unwrap();
        assert_eq!(config, BrowserConfig::default());
        assert_eq!(config.render.chunk_size, 250);
        assert_eq!(config.render.glyph_buffer, Size::new(32.0, 32.0));
        assert_eq!(config.render.max_approximate_frames, 4);
    }

    #[test]
    fn preset_is_used_without_segments() {
        let config = BrowserConfig::default();
        let coords = config.coord_sys().unwrap();
        assert_eq!(coords.len(), 24);
        assert_eq!(coords.segments()[0].size, 249_250_621);
        assert_eq!(coords.segments()[23].id, "Y");
    }

    #[test]
    fn explicit_segments_override_preset() {
        let json = r#"{
            "genome": { "segments": [{"id": "1", "size": 1000}, {"id": "2", "size": 500}], "padding": 10 },
            "view": { "min_width": 20, "initial": [0, 200] }
        }"#;
        let config = BrowserConfig::from_json(json).unwrap();
        let coords = config.coord_sys().unwrap();
        assert_eq!(coords.total_size(), 1510);
        assert_eq!(config.initial_view(&coords), Interval::new(0.0, 200.0));
    }

    #[test]
    fn rejects_invalid_values() {
        let err = BrowserConfig::from_json(r#"{"render": {"chunk_size": 0}}"#);
        assert!(matches!(
            err,
            Err(ConfigError::InvalidValue {
                field: "render.chunk_size",
                ..
            })
        ));
        let err = BrowserConfig::from_json(r#"{"view": {"min_width": 0}}"#);
        assert!(matches!(err, Err(ConfigError::InvalidValue { .. })));
        assert!(matches!(
            BrowserConfig::from_json("{ nope"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn negative_segment_size_fails_build() {
        let json = r#"{"genome": {"segments": [{"id": "1", "size": -4}]}}"#;
        let config = BrowserConfig::from_json(json).unwrap();
        assert!(matches!(
            config.coord_sys(),
            Err(ConfigError::NonPositiveSize { size: -4, .. })
        ));
    }
}
