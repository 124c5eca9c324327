pub mod commands;
pub mod drawing;
pub mod ident;
pub mod interval;
pub mod renderable;
pub mod theme;
pub mod types;

pub use commands::{RenderCommand, TextAlign};
pub use drawing::Drawing;
pub use ident::{Ident, SegmentId};
pub use interval::Interval;
pub use renderable::{GlyphBatch, GlyphPoint, Gravity, Label, Renderable};
pub use theme::ThemeToken;
pub use types::{Padding, Point, Rect, Size};
