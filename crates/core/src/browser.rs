//! The genome browser track: chromosome frames, annotations and a GWAS
//! scatter over a fixed score axis.

use std::sync::Arc;

use genoview_protocol::{Drawing, Renderable, Size};

use crate::config::GwasConfig;
use crate::coords::CoordSys;
use crate::error::ViewError;
use crate::features::{Feature, FeatureSet};
use crate::runtime::{LayerSpec, Track};
use crate::scale::LinearScale;
use crate::slot::{Component, LayerType, TrackDimensions};
use crate::track::LayerHandle;
use crate::view::View;
use crate::views::{Annotation, Scored, render_annotations, render_frames, render_gwas, render_score_axis};

pub const FRAMES: &str = "frames";
pub const ANNOTATIONS: &str = "annotations";
pub const GWAS: &str = "gwas";
pub const AXIS: &str = "axis";

const LAYERS: [LayerSpec; 4] = [
    LayerSpec::new(FRAMES, LayerType::Scrolling, Component::Padded),
    LayerSpec::new(ANNOTATIONS, LayerType::Scrolling, Component::Padded),
    LayerSpec::new(GWAS, LayerType::Scrolling, Component::Padded),
    LayerSpec::new(AXIS, LayerType::Fixed, Component::Outside),
];

#[derive(Debug, Clone)]
pub struct GenomeBrowser<P> {
    coords: Arc<CoordSys>,
    snps: FeatureSet<P>,
    annotations: FeatureSet<Annotation>,
    gwas: GwasConfig,
}

impl<P> GenomeBrowser<P> {
    pub fn new(coords: Arc<CoordSys>, gwas: GwasConfig) -> Self {
        let snps = FeatureSet::build(&coords, std::iter::empty()).0;
        let annotations = FeatureSet::build(&coords, std::iter::empty()).0;
        Self {
            coords,
            snps,
            annotations,
            gwas,
        }
    }

    pub fn with_snps(mut self, snps: FeatureSet<P>) -> Self {
        self.snps = snps;
        self
    }

    pub fn with_annotations(mut self, annotations: FeatureSet<Annotation>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn coords(&self) -> &CoordSys {
        &self.coords
    }
}

impl<P> Track for GenomeBrowser<P>
where
    P: Scored + Clone + Send + Sync + 'static,
{
    type Feature = Feature<P>;
    /// The score axis.
    type Prepared = Drawing;

    fn layers(&self) -> Vec<LayerSpec> {
        LAYERS.to_vec()
    }

    fn prepare(&self, dims: &TrackDimensions) -> Drawing {
        render_score_axis(dims, &self.gwas)
    }

    fn render_layer(
        &self,
        layer: &LayerHandle,
        axis: &Drawing,
        slot: Size,
        view: View,
    ) -> Result<Vec<Renderable<Feature<P>>>, ViewError> {
        if layer.name() == &AXIS {
            return Ok(vec![Renderable::Drawing(axis.clone())]);
        }
        let scale = LinearScale::for_view(slot.width, view)?;
        let out = match layer.name().as_str() {
            FRAMES => render_frames(&self.coords, &scale, slot),
            ANNOTATIONS => render_annotations(&self.annotations, &scale, slot),
            GWAS => render_gwas(&self.snps, self.coords.full_view(), &scale, slot, &self.gwas),
            _ => Vec::new(),
        };
        Ok(out)
    }
}
