pub mod annotations;
pub mod frames;
pub mod gwas;
pub mod score_axis;

pub use annotations::{Annotation, render_annotations};
pub use frames::render_frames;
pub use gwas::{Scored, Snp, render_gwas, score_y};
pub use score_axis::render_score_axis;
