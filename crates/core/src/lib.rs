//! Coordinate system, view engine and layered-canvas rendering for a genome
//! browser.

pub mod browser;
pub mod buffered;
pub mod cache;
pub mod config;
pub mod coords;
pub mod error;
pub mod features;
pub mod hotspots;
pub mod labels;
pub mod runtime;
pub mod scale;
pub mod slot;
pub mod surface;
pub mod svg;
pub mod track;
pub mod view;
pub mod views;

pub use browser::GenomeBrowser;
pub use buffered::BufferedCanvas;
pub use cache::{CacheStats, RenderCache};
pub use config::BrowserConfig;
pub use coords::{CoordSys, Locus, Segment, VisibleSegment};
pub use error::{BrowserError, ConfigError, LayerError, ViewError};
pub use features::{Extras, Feature, FeatureLoader, FeatureRecord, FeatureSet, feature_channel};
pub use hotspots::HotspotIndex;
pub use runtime::{BrowserHandle, FrameStats, LayerSpec, Track, TrackCommand, snapshot, spawn};
pub use scale::LinearScale;
pub use slot::{Clip, Component, LayerType, Placement, Side, TrackDimensions};
pub use surface::{Cell, RasterSurface, Surface};
pub use track::{CancelToken, DrawOutcome, LayerHandle, TrackContainer};
pub use view::{View, ViewBatch, ViewCommand, ViewLimits};
