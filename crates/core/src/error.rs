use genoview_protocol::{Ident, SegmentId};
use thiserror::Error;

/// Invalid construction input. Fatal at startup: no partial coordinate
/// system or browser is produced.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("coordinate system needs at least one segment")]
    EmptySegments,
    #[error("segment {id} has non-positive size {size}")]
    NonPositiveSize { id: SegmentId, size: i64 },
    #[error("segment {0} listed twice")]
    DuplicateSegment(SegmentId),
    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// A view reached pixel mapping with zero or negative width.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ViewError {
    #[error("degenerate view [{low}, {high})")]
    Degenerate { low: f64, high: f64 },
}

/// Per-call track container failures. The container is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    #[error("no layer named {0}")]
    Missing(Ident),
    #[error("z-order {got:?} does not match layers {expected:?}")]
    InvalidOrder { expected: Vec<Ident>, got: Vec<Ident> },
}

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("view: {0}")]
    View(#[from] ViewError),
    #[error("layer: {0}")]
    Layer(#[from] LayerError),
    #[error("browser runtime has stopped")]
    Closed,
}
