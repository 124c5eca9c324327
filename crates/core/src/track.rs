//! The track container: named layers, their surfaces, and the draw pass.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use genoview_protocol::{
    Drawing, GlyphPoint, Ident, Interval, Label, Point, Rect, Renderable, Size, ThemeToken,
};
use tracing::{debug, trace};

use crate::buffered::BufferedCanvas;
use crate::config::{LabelConfig, RenderConfig};
use crate::error::LayerError;
use crate::hotspots::HotspotIndex;
use crate::labels;
use crate::slot::{Clip, Component, LayerType, Placement, TrackDimensions};
use crate::surface::Surface;

/// Cooperative cancellation flag for a draw pass.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    Completed { chunks: usize },
    /// Stopped at a chunk boundary. Not an error.
    Cancelled { chunks: usize },
}

/// Names a layer of one container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayerHandle(Ident);

impl LayerHandle {
    pub fn name(&self) -> &Ident {
        &self.0
    }
}

impl From<&str> for LayerHandle {
    fn from(name: &str) -> Self {
        Self(name.into())
    }
}

#[derive(Debug)]
pub enum LayerSurface<S> {
    Fixed(S),
    Scrolling(BufferedCanvas<S>),
}

impl<S: Surface> LayerSurface<S> {
    fn new(kind: LayerType, size: Size) -> Self {
        match kind {
            LayerType::Fixed => LayerSurface::Fixed(S::new(size)),
            LayerType::Scrolling => LayerSurface::Scrolling(BufferedCanvas::new(size)),
        }
    }

    /// The surface on screen.
    pub fn visible(&self) -> &S {
        match self {
            LayerSurface::Fixed(s) => s,
            LayerSurface::Scrolling(c) => c.front(),
        }
    }

    fn visible_mut(&mut self) -> &mut S {
        match self {
            LayerSurface::Fixed(s) => s,
            LayerSurface::Scrolling(c) => c.front_mut(),
        }
    }

    fn resize(&mut self, size: Size) {
        match self {
            LayerSurface::Fixed(s) => s.resize(size),
            LayerSurface::Scrolling(c) => c.resize(size),
        }
    }
}

#[derive(Debug)]
pub struct Layer<S> {
    name: Ident,
    kind: LayerType,
    component: Component,
    surface: LayerSurface<S>,
}

impl<S: Surface> Layer<S> {
    pub fn name(&self) -> &Ident {
        &self.name
    }

    pub fn kind(&self) -> LayerType {
        self.kind
    }

    pub fn component(&self) -> Component {
        self.component
    }

    pub fn surface(&self) -> &LayerSurface<S> {
        &self.surface
    }

    fn place(&mut self, placement: &Placement) {
        let s = self.surface.visible_mut();
        s.set_translation(placement.offset);
        s.set_clip(placement.clip);
    }
}

/// One unit of draw work. Glyph stamps are counted individually so large
/// scatter batches still yield between chunks.
enum Step<'a, F> {
    Draw(&'a Drawing),
    Big(&'a Drawing, &'a Rect),
    Glyph(&'a Drawing),
    Stamp(&'a GlyphPoint<F>),
    Labels(&'a [Label]),
}

fn plan<F>(renderables: &[Renderable<F>]) -> Vec<Step<'_, F>> {
    let mut steps = Vec::with_capacity(renderables.len());
    for r in renderables {
        match r {
            Renderable::Drawing(d) => steps.push(Step::Draw(d)),
            Renderable::BigDrawing { drawing, bounds } => steps.push(Step::Big(drawing, bounds)),
            Renderable::DrawingBatch(batches) => {
                for batch in batches {
                    steps.push(Step::Glyph(&batch.glyph));
                    steps.extend(batch.points.iter().map(Step::Stamp));
                }
            }
            Renderable::Labels(labels) => steps.push(Step::Labels(labels)),
        }
    }
    steps
}

/// State of a draw pass in progress on one layer.
#[derive(Debug, Clone, Copy)]
pub struct DrawPass {
    layer: usize,
    visible: Interval<f64>,
    /// Device position of content pixel `(0, 0)`.
    origin: Point,
}

/// Owns the layers of a track, in z-order from bottom to top, plus the
/// shared glyph buffer.
///
/// `F` is the feature attached to glyph points; the container hands it
/// back from hit tests.
#[derive(Debug)]
pub struct TrackContainer<S, F = ()> {
    dims: TrackDimensions,
    layers: Vec<Layer<S>>,
    glyphs: S,
    chunk_size: usize,
    labels: LabelConfig,
    label_color: ThemeToken,
    hotspots: HotspotIndex<F>,
}

impl<S: Surface, F: Clone> TrackContainer<S, F> {
    pub fn new(dims: TrackDimensions, render: &RenderConfig, labels: LabelConfig) -> Self {
        Self {
            dims,
            layers: Vec::new(),
            glyphs: S::new(render.glyph_buffer),
            chunk_size: render.chunk_size.max(1),
            labels,
            label_color: ThemeToken::TextPrimary,
            hotspots: HotspotIndex::new(),
        }
    }

    pub fn dims(&self) -> TrackDimensions {
        self.dims
    }

    pub fn set_label_color(&mut self, color: ThemeToken) {
        self.label_color = color;
    }

    pub fn hotspots(&self) -> &HotspotIndex<F> {
        &self.hotspots
    }

    pub fn glyph_buffer(&self) -> &S {
        &self.glyphs
    }

    fn index(&self, name: &str) -> Result<usize, LayerError> {
        self.layers
            .iter()
            .position(|l| l.name.as_str() == name)
            .ok_or_else(|| LayerError::Missing(name.into()))
    }

    pub fn layer(&self, name: &str) -> Result<&Layer<S>, LayerError> {
        self.index(name).map(|i| &self.layers[i])
    }

    /// Layer names from bottom to top.
    pub fn layer_names(&self) -> Vec<Ident> {
        self.layers.iter().map(|l| l.name.clone()).collect()
    }

    pub fn layers(&self) -> impl Iterator<Item = &Layer<S>> {
        self.layers.iter()
    }

    /// Add a layer on top, or replace the same-named one where it stands.
    pub fn create_layer(&mut self, name: impl Into<Ident>, kind: LayerType, component: Component) -> LayerHandle {
        let name = name.into();
        let mut layer = Layer {
            name: name.clone(),
            kind,
            component,
            surface: LayerSurface::new(kind, self.dims.size),
        };
        layer.place(&self.dims.placement(component));
        match self.layers.iter().position(|l| l.name == name) {
            Some(i) => {
                debug!(layer = %name, "layer replaced");
                self.layers[i] = layer;
            }
            None => self.layers.push(layer),
        }
        LayerHandle(name)
    }

    pub fn delete_layer(&mut self, name: &str) -> Result<(), LayerError> {
        let i = self.index(name)?;
        self.layers.remove(i);
        Ok(())
    }

    /// Ask the application for a layer's renderables, sized to its slot.
    pub fn render<R>(&self, handle: &LayerHandle, draw: impl FnOnce(Size) -> R) -> Result<R, LayerError> {
        let layer = self.layer(handle.name())?;
        Ok(draw(self.dims.placement(layer.component).slot))
    }

    /// Forget the hotspots of the previous frame.
    pub fn begin_frame(&mut self) {
        self.hotspots.clear();
    }

    /// Clear a layer and position it for drawing content whose pixels
    /// `visible` are on screen.
    pub fn begin_draw(&mut self, handle: &LayerHandle, visible: Interval<f64>) -> Result<DrawPass, LayerError> {
        let i = self.index(handle.name())?;
        let placement = self.dims.placement(self.layers[i].component);
        let layer = &mut self.layers[i];
        layer.place(&placement);
        let surface = layer.surface.visible_mut();
        let bounds = surface.bounds();
        surface.clear(bounds);
        let origin = Point::new(placement.offset.x - visible.low, placement.offset.y);
        surface.set_translation(origin);
        Ok(DrawPass { layer: i, visible, origin })
    }

    fn run_steps(&mut self, pass: &DrawPass, steps: &[Step<'_, F>]) {
        let glyph_size = self.glyphs.size();
        let measure_fallback = self.labels.char_width;
        let Some(layer) = self.layers.get_mut(pass.layer) else {
            return;
        };
        let surface = layer.surface.visible_mut();
        for step in steps {
            match step {
                Step::Draw(d) => surface.draw(d),
                Step::Big(d, bounds) => {
                    if bounds.x <= pass.visible.high && bounds.right() >= pass.visible.low {
                        surface.draw(d);
                    }
                }
                Step::Glyph(glyph) => {
                    let all = self.glyphs.bounds();
                    self.glyphs.clear(all);
                    self.glyphs
                        .set_translation(Point::new(glyph_size.width / 2.0, glyph_size.height / 2.0));
                    self.glyphs.draw(glyph);
                }
                Step::Stamp(p) => {
                    if !pass.visible.contains(p.at.x) {
                        continue;
                    }
                    let at = Point::new(pass.origin.x + p.at.x, pass.origin.y + p.at.y);
                    let dst = Rect::new(
                        at.x - glyph_size.width / 2.0,
                        at.y - glyph_size.height / 2.0,
                        glyph_size.width,
                        glyph_size.height,
                    );
                    surface.blit(&self.glyphs, self.glyphs.bounds(), dst);
                    self.hotspots.record(at, p.feature.clone());
                }
                Step::Labels(labels) => {
                    let placed = labels::place(pass.visible, labels.iter(), &self.labels, |text| {
                        surface
                            .measure_text(text, self.labels.font_size)
                            .unwrap_or(text.chars().count() as f64 * measure_fallback)
                    });
                    for p in &placed {
                        surface.draw(&p.to_drawing(self.label_color, self.labels.font_size));
                    }
                }
            }
        }
    }

    /// Draw everything in one go.
    pub fn draw_now(
        &mut self,
        handle: &LayerHandle,
        visible: Interval<f64>,
        renderables: &[Renderable<F>],
    ) -> Result<(), LayerError> {
        let pass = self.begin_draw(handle, visible)?;
        let steps = plan(renderables);
        self.run_steps(&pass, &steps);
        Ok(())
    }

    /// Draw `renderables` in chunks, yielding to the runtime between chunks
    /// and stopping early once `cancel` is set.
    pub async fn draw_on_canvas(
        &mut self,
        handle: &LayerHandle,
        visible: Interval<f64>,
        renderables: &[Renderable<F>],
        cancel: &CancelToken,
    ) -> Result<DrawOutcome, LayerError> {
        let pass = self.begin_draw(handle, visible)?;
        let steps = plan(renderables);
        let mut chunks = 0;
        for chunk in steps.chunks(self.chunk_size) {
            if chunks > 0 {
                tokio::task::yield_now().await;
            }
            if cancel.is_cancelled() {
                trace!(layer = %handle.name(), chunks, "draw cancelled");
                return Ok(DrawOutcome::Cancelled { chunks });
            }
            self.run_steps(&pass, chunk);
            chunks += 1;
        }
        trace!(layer = %handle.name(), chunks, steps = steps.len(), "draw completed");
        Ok(DrawOutcome::Completed { chunks })
    }

    /// The vector equivalent of a draw pass: `renderables` culled and placed
    /// as [`draw_on_canvas`](Self::draw_on_canvas) would, in container
    /// coordinates. Glyphs are repeated at every visible point and labels are
    /// measured at `char_width` per character.
    pub fn vector(
        &self,
        handle: &LayerHandle,
        visible: Interval<f64>,
        renderables: &[Renderable<F>],
    ) -> Result<Drawing, LayerError> {
        let layer = self.layer(handle.name())?;
        let placement = self.dims.placement(layer.component);
        let mut out = Drawing::empty();
        for r in renderables {
            match r {
                Renderable::Drawing(d) => out.push(d.clone()),
                Renderable::BigDrawing { drawing, bounds } => {
                    if bounds.x <= visible.high && bounds.right() >= visible.low {
                        out.push(drawing.clone());
                    }
                }
                Renderable::DrawingBatch(batches) => {
                    for batch in batches {
                        for p in batch.points.iter().filter(|p| visible.contains(p.at.x)) {
                            out.push(batch.glyph.clone().translated(p.at.x, p.at.y));
                        }
                    }
                }
                Renderable::Labels(list) => {
                    let char_width = self.labels.char_width;
                    let placed = labels::place(visible, list.iter(), &self.labels, |text| {
                        text.chars().count() as f64 * char_width
                    });
                    for p in &placed {
                        out.push(p.to_drawing(self.label_color, self.labels.font_size));
                    }
                }
            }
        }
        let out = out.translated(placement.offset.x - visible.low, placement.offset.y);
        Ok(match placement.clip {
            Some(Clip::Rect(rect)) => out.clipped(rect),
            _ => out,
        })
    }

    /// New canvas size. Every layer is reallocated blank.
    pub fn resize(&mut self, size: Size) {
        self.dims.size = size;
        for layer in &mut self.layers {
            layer.surface.resize(size);
            layer.place(&self.dims.placement(layer.component));
        }
        self.hotspots.clear();
        debug!(width = size.width, height = size.height, "track resized");
    }

    /// Preview a pan by moving the pixels of every scrolling layer.
    pub fn scroll(&mut self, dx: f64) {
        for layer in &mut self.layers {
            if let LayerSurface::Scrolling(canvas) = &mut layer.surface {
                canvas.scroll(dx);
            }
        }
        self.hotspots.scrolled(dx);
    }

    /// Preview a zoom: the `[left, right]` fractions of each scrolling
    /// layer's slot are stretched across the slot.
    pub fn zoom(&mut self, left: f64, right: f64) {
        for layer in &mut self.layers {
            let region = self
                .dims
                .placement(layer.component)
                .clip
                .map_or(self.dims.full(), |c| c.bounds());
            if let LayerSurface::Scrolling(canvas) = &mut layer.surface {
                canvas.zoom(left, right, region);
            }
        }
        let padded = self.dims.padded();
        self.hotspots.zoomed(left, right, padded.x, padded.w);
    }

    /// Restack layers to match `order`, bottom first. `order` must name
    /// every layer exactly once; otherwise nothing changes.
    pub fn z_index<N: AsRef<str>>(&mut self, order: &[N]) -> Result<(), LayerError> {
        let mismatch = || LayerError::InvalidOrder {
            expected: self.layer_names(),
            got: order.iter().map(|n| Ident::new(n.as_ref())).collect(),
        };
        if order.len() != self.layers.len() {
            return Err(mismatch());
        }
        let mut picked = Vec::with_capacity(order.len());
        for name in order {
            match self.layers.iter().position(|l| l.name.as_str() == name.as_ref()) {
                Some(i) if !picked.contains(&i) => picked.push(i),
                _ => return Err(mismatch()),
            }
        }
        let mut slots: Vec<Option<Layer<S>>> = self.layers.drain(..).map(Some).collect();
        self.layers = picked.into_iter().filter_map(|i| slots[i].take()).collect();
        Ok(())
    }

    /// A container-relative click in the slot coordinates of `handle`'s
    /// layer.
    pub fn click(&self, handle: &LayerHandle, at: Point) -> Result<Point, LayerError> {
        let layer = self.layer(handle.name())?;
        Ok(self.dims.to_slot(layer.component, at))
    }

    /// All layers flattened onto one surface, bottom first.
    pub fn composite(&self) -> S {
        let mut out = S::new(self.dims.size);
        let all = out.bounds();
        for layer in &self.layers {
            out.blit(layer.surface.visible(), all, all);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RasterSurface;
    use genoview_protocol::{GlyphBatch, Gravity, Padding, RenderCommand};

    type Container = TrackContainer<RasterSurface, u32>;

    fn container() -> Container {
        let dims = TrackDimensions::new(Size::new(100.0, 20.0), Padding::new(10.0, 0.0, 2.0, 0.0));
        let render = RenderConfig {
            chunk_size: 2,
            glyph_buffer: Size::new(3.0, 3.0),
            ..RenderConfig::default()
        };
        TrackContainer::new(dims, &render, LabelConfig::default())
    }

    fn dot() -> Drawing {
        Drawing::circle(Point::new(0.0, 0.0), 0.0, ThemeToken::SnpPoint)
    }

    fn batch(xs: &[f64]) -> Renderable<u32> {
        let mut b = GlyphBatch::new(dot());
        for (i, x) in xs.iter().enumerate() {
            b.push(Point::new(*x, 5.0), i as u32);
        }
        Renderable::DrawingBatch(vec![b])
    }

    fn front(c: &Container, name: &str) -> RasterSurface {
        c.layer(name).unwrap().surface().visible().clone()
    }

    #[test]
    fn create_replaces_in_place() {
        let mut c = container();
        c.create_layer("a", LayerType::Fixed, Component::Full);
        c.create_layer("b", LayerType::Scrolling, Component::Padded);
        c.create_layer("a", LayerType::Scrolling, Component::Padded);
        assert_eq!(c.layer_names(), ["a", "b"]);
        assert_eq!(c.layer("a").unwrap().kind(), LayerType::Scrolling);
    }

    #[test]
    fn missing_layer_is_an_error() {
        let mut c = container();
        let ghost = LayerHandle::from("ghost");
        assert_eq!(c.delete_layer("ghost"), Err(LayerError::Missing("ghost".into())));
        assert!(c.draw_now(&ghost, Interval::new(0.0, 10.0), &[]).is_err());
        assert!(c.click(&ghost, Point::default()).is_err());
    }

    #[test]
    fn batch_blits_only_visible_points() {
        let mut c = container();
        let h = c.create_layer("gwas", LayerType::Scrolling, Component::Padded);
        c.draw_now(&h, Interval::new(0.0, 50.0), &[batch(&[10.0, 70.0, 40.0])]).unwrap();
        let s = front(&c, "gwas");
        assert_eq!(s.stats().blits, 2);
        assert_eq!(c.glyph_buffer().stats().draws, 1);
        assert_eq!(c.hotspots().len(), 2);
        // padding.left 10 + content x 10, padding.top 2 + y 5
        assert!(s.cell(20, 7).is_some());
    }

    #[test]
    fn content_is_shifted_by_visible_start() {
        let mut c = container();
        let h = c.create_layer("gwas", LayerType::Scrolling, Component::Padded);
        c.draw_now(&h, Interval::new(100.0, 190.0), &[batch(&[150.0])]).unwrap();
        assert!(front(&c, "gwas").cell(60, 7).is_some());
    }

    #[test]
    fn big_drawing_is_culled() {
        let mut c = container();
        let h = c.create_layer("genes", LayerType::Scrolling, Component::Padded);
        let gene = |x: f64| {
            let r = Rect::new(x, 0.0, 5.0, 2.0);
            Renderable::BigDrawing {
                drawing: Drawing::rect(r, ThemeToken::GeneFill, None),
                bounds: r,
            }
        };
        c.draw_now(&h, Interval::new(0.0, 50.0), &[gene(10.0), gene(200.0)]).unwrap();
        assert_eq!(front(&c, "genes").stats().draws, 1);
    }

    #[test]
    fn vector_matches_the_draw_pass() {
        let mut c = container();
        let h = c.create_layer("gwas", LayerType::Scrolling, Component::Padded);
        let gene = Rect::new(10.0, 0.0, 5.0, 2.0);
        let frame = [
            batch(&[150.0, 50.0, 180.0]),
            Renderable::BigDrawing {
                drawing: Drawing::rect(gene, ThemeToken::GeneFill, None),
                bounds: gene,
            },
        ];
        let d = c.vector(&h, Interval::new(100.0, 190.0), &frame).unwrap();
        let cmds = d.commands();
        assert_eq!(
            cmds[0],
            RenderCommand::SetClip {
                rect: Rect::new(10.0, 2.0, 90.0, 18.0)
            }
        );
        assert_eq!(
            cmds[1],
            RenderCommand::PushTransform {
                translate: Point::new(-90.0, 2.0)
            }
        );
        let circles = cmds
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawCircle { .. }))
            .count();
        assert_eq!(circles, 2);
        assert!(!cmds.iter().any(|c| matches!(c, RenderCommand::DrawRect { .. })));
        // vector output leaves the raster state alone
        assert_eq!(front(&c, "gwas").filled_cells(), 0);
        assert!(c.hotspots().is_empty());
    }

    #[test]
    fn padded_layer_is_clipped() {
        let mut c = container();
        let h = c.create_layer("genes", LayerType::Scrolling, Component::Padded);
        let wide = Drawing::rect(Rect::new(-20.0, 0.0, 200.0, 1.0), ThemeToken::GeneFill, None);
        c.draw_now(&h, Interval::new(0.0, 90.0), &[Renderable::Drawing(wide)]).unwrap();
        let s = front(&c, "genes");
        assert!(s.cell(5, 2).is_none());
        assert!(s.cell(10, 2).is_some());
        assert!(s.cell(99, 2).is_some());
    }

    #[test]
    fn labels_are_placed_without_overlap() {
        let mut c = container();
        let h = c.create_layer("labels", LayerType::Scrolling, Component::Padded);
        let labels = vec![
            Label::new("alpha", Point::new(20.0, 3.0), Gravity::Center),
            Label::new("beta", Point::new(22.0, 3.0), Gravity::Center),
            Label::new("gamma", Point::new(60.0, 3.0), Gravity::Center),
        ];
        c.draw_now(&h, Interval::new(0.0, 90.0), &[Renderable::Labels(labels)]).unwrap();
        let row = front(&c, "labels").row_text(5);
        assert!(row.contains("alpha"));
        assert!(!row.contains("beta"));
        assert!(row.contains("gamma"));
    }

    #[test]
    fn z_index_reorders_or_fails_cleanly() {
        let mut c = container();
        c.create_layer("a", LayerType::Fixed, Component::Full);
        c.create_layer("b", LayerType::Fixed, Component::Full);
        c.create_layer("c", LayerType::Fixed, Component::Full);
        c.z_index(&["c", "a", "b"]).unwrap();
        assert_eq!(c.layer_names(), ["c", "a", "b"]);
        assert!(matches!(c.z_index(&["a", "b"]), Err(LayerError::InvalidOrder { .. })));
        assert!(c.z_index(&["a", "a", "b"]).is_err());
        assert!(c.z_index(&["a", "b", "x"]).is_err());
        assert_eq!(c.layer_names(), ["c", "a", "b"]);
    }

    #[test]
    fn click_is_slot_relative() {
        let mut c = container();
        let padded = c.create_layer("p", LayerType::Scrolling, Component::Padded);
        let full = c.create_layer("f", LayerType::Fixed, Component::Full);
        assert_eq!(c.click(&padded, Point::new(15.0, 4.0)).unwrap(), Point::new(5.0, 2.0));
        assert_eq!(c.click(&full, Point::new(15.0, 4.0)).unwrap(), Point::new(15.0, 4.0));
    }

    #[test]
    fn scroll_moves_scrolling_layers_only() {
        let mut c = container();
        let s = c.create_layer("s", LayerType::Scrolling, Component::Full);
        let f = c.create_layer("f", LayerType::Fixed, Component::Full);
        let block = Renderable::Drawing(Drawing::rect(Rect::new(5.0, 0.0, 1.0, 1.0), ThemeToken::GeneFill, None));
        c.draw_now(&s, Interval::new(0.0, 100.0), std::slice::from_ref(&block)).unwrap();
        c.draw_now(&f, Interval::new(0.0, 100.0), &[block]).unwrap();
        c.scroll(4.0);
        assert!(front(&c, "s").cell(9, 0).is_some());
        assert!(front(&c, "f").cell(5, 0).is_some());
    }

    #[test]
    fn resize_blanks_layers() {
        let mut c = container();
        let h = c.create_layer("s", LayerType::Scrolling, Component::Padded);
        c.draw_now(&h, Interval::new(0.0, 90.0), &[batch(&[10.0])]).unwrap();
        c.resize(Size::new(60.0, 10.0));
        let s = front(&c, "s");
        assert_eq!(s.size(), Size::new(60.0, 10.0));
        assert_eq!(s.filled_cells(), 0);
        assert!(c.hotspots().is_empty());
    }

    #[tokio::test]
    async fn cancelled_draw_stops_at_chunk_boundary() {
        let mut c = container();
        let h = c.create_layer("gwas", LayerType::Scrolling, Component::Padded);
        let cancel = CancelToken::new();
        cancel.cancel();
        let outcome = c
            .draw_on_canvas(&h, Interval::new(0.0, 90.0), &[batch(&[1.0, 2.0, 3.0, 4.0])], &cancel)
            .await
            .unwrap();
        assert_eq!(outcome, DrawOutcome::Cancelled { chunks: 0 });
        assert_eq!(front(&c, "gwas").stats().blits, 0);
    }

    #[tokio::test]
    async fn chunked_draw_completes() {
        let mut c = container();
        let h = c.create_layer("gwas", LayerType::Scrolling, Component::Padded);
        let outcome = c
            .draw_on_canvas(&h, Interval::new(0.0, 90.0), &[batch(&[1.0, 2.0, 3.0])], &CancelToken::new())
            .await
            .unwrap();
        // glyph + 3 stamps in chunks of 2
        assert_eq!(outcome, DrawOutcome::Completed { chunks: 2 });
        assert_eq!(front(&c, "gwas").stats().blits, 3);
    }

    #[test]
    fn composite_stacks_layers() {
        let mut c = container();
        let below = c.create_layer("below", LayerType::Fixed, Component::Full);
        let above = c.create_layer("above", LayerType::Fixed, Component::Full);
        let fill = |color| Renderable::Drawing(Drawing::rect(Rect::new(0.0, 0.0, 2.0, 1.0), color, None));
        c.draw_now(&below, Interval::new(0.0, 100.0), &[fill(ThemeToken::GeneFill)]).unwrap();
        c.draw_now(&above, Interval::new(0.0, 100.0), &[fill(ThemeToken::Highlight)]).unwrap();
        let out = c.composite();
        assert_eq!(out.cell(0, 0).map(|c| c.color), Some(ThemeToken::Highlight));
    }
}
