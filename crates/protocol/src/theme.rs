use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the presenting surface's palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,
    Border,

    // Chromosome frames
    SegmentBandEven,
    SegmentBandOdd,
    SegmentBorder,
    SegmentLabel,

    // GWAS scatter
    SnpPoint,
    SnpSignificant,
    SignificanceLine,

    // Annotations
    GeneFill,
    GeneBorder,
    GeneLabel,

    // Axis
    AxisLine,
    AxisTick,
    AxisText,

    TextPrimary,
    TextMuted,
    Highlight,
}
