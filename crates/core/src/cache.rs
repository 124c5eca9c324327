use std::convert::Infallible;
use std::sync::Arc;

use crate::slot::TrackDimensions;
use crate::view::View;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub partial_hits: u64,
    pub partial_misses: u64,
    pub final_hits: u64,
    pub final_misses: u64,
}

/// Memoizes the two render stages of a track.
///
/// The *partial* stage depends only on the canvas dimensions. The *final*
/// stage also depends on the view width, but not on its offset: panning at
/// a fixed zoom reuses the previous result.
#[derive(Debug)]
pub struct RenderCache<P, R> {
    dims: Option<TrackDimensions>,
    width: Option<f64>,
    partial: Option<Arc<P>>,
    result: Option<Arc<R>>,
    stats: CacheStats,
}

impl<P, R> Default for RenderCache<P, R> {
    fn default() -> Self {
        Self {
            dims: None,
            width: None,
            partial: None,
            result: None,
            stats: CacheStats::default(),
        }
    }
}

/// View widths drift by a few ulps under translation.
fn same_width(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs())
}

impl<P, R> RenderCache<P, R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop both stages.
    pub fn invalidate(&mut self) {
        self.dims = None;
        self.width = None;
        self.partial = None;
        self.result = None;
    }

    pub fn get(
        &mut self,
        dims: TrackDimensions,
        view: View,
        partial: impl FnOnce(&TrackDimensions) -> P,
        finish: impl FnOnce(&P, &TrackDimensions, View) -> R,
    ) -> Arc<R> {
        match self.try_get::<Infallible>(dims, view, |d| Ok(partial(d)), |p, d, v| Ok(finish(p, d, v))) {
            Ok(result) => result,
            Err(never) => match never {},
        }
    }

    /// [`get`](Self::get) with fallible stages. A failed stage leaves
    /// nothing cached for it.
    pub fn try_get<E>(
        &mut self,
        dims: TrackDimensions,
        view: View,
        partial: impl FnOnce(&TrackDimensions) -> Result<P, E>,
        finish: impl FnOnce(&P, &TrackDimensions, View) -> Result<R, E>,
    ) -> Result<Arc<R>, E> {
        if self.dims != Some(dims) {
            if self.dims.is_some() {
                tracing::debug!(width = dims.size.width, height = dims.size.height, "canvas changed, render cache dropped");
            }
            self.invalidate();
            self.dims = Some(dims);
        }

        let partial = match &self.partial {
            Some(p) => {
                self.stats.partial_hits += 1;
                Arc::clone(p)
            }
            None => {
                self.stats.partial_misses += 1;
                let p = Arc::new(partial(&dims)?);
                self.partial = Some(Arc::clone(&p));
                p
            }
        };

        let width = view.size();
        if !self.width.is_some_and(|w| same_width(w, width)) {
            self.result = None;
        }

        if let Some(r) = &self.result {
            self.stats.final_hits += 1;
            return Ok(Arc::clone(r));
        }
        self.stats.final_misses += 1;
        let r = Arc::new(finish(&partial, &dims, view)?);
        self.width = Some(width);
        self.result = Some(Arc::clone(&r));
        Ok(r)
    }
}
