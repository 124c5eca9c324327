//! The browser runtime: one view task and one main loop per track.
//!
//! ```text
//!  queue_update_view ──► view task ──(debounce, merge)──► watch<View>
//!                          │  previews                        │
//!                          ▼                                  ▼
//!  queue_command ─────► main loop ──► RenderCache ──► TrackContainer
//! ```
//!
//! The view task coalesces view commands that arrive within the debounce
//! window, publishes the settled view and then queues a render. Until then,
//! scroll and zoom commands are forwarded as re-blit previews. The main loop
//! processes container commands strictly in order and never runs two draw
//! passes at once: a command arriving mid-pass cancels the pass at its next
//! chunk boundary.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use genoview_protocol::{Drawing, Interval, Point, Renderable, Size};
use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, trace, warn};

use crate::cache::{CacheStats, RenderCache};
use crate::config::BrowserConfig;
use crate::coords::CoordSys;
use crate::error::{BrowserError, ConfigError, ViewError};
use crate::hotspots::HotspotIndex;
use crate::scale::LinearScale;
use crate::slot::{Component, LayerType, TrackDimensions};
use crate::surface::{RasterSurface, Surface};
use crate::track::{CancelToken, DrawOutcome, LayerHandle, TrackContainer};
use crate::view::{View, ViewBatch, ViewCommand, ViewLimits, normalize};

/// A layer a track wants the container to hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSpec {
    pub name: &'static str,
    pub kind: LayerType,
    pub component: Component,
}

impl LayerSpec {
    pub const fn new(name: &'static str, kind: LayerType, component: Component) -> Self {
        Self { name, kind, component }
    }
}

/// Application code the runtime draws.
///
/// Rendering has two stages. [`prepare`](Track::prepare) depends only on the
/// canvas and is recomputed on resize. [`render_layer`](Track::render_layer)
/// also depends on the view width; its output must be positioned in content
/// pixels (see [`LinearScale`]) so that it can be reused while panning.
pub trait Track: Send + 'static {
    /// Handed back by hit tests.
    type Feature: Clone + Send + Sync + 'static;
    type Prepared: Send + Sync + 'static;

    /// Layers from bottom to top.
    fn layers(&self) -> Vec<LayerSpec>;

    fn prepare(&self, dims: &TrackDimensions) -> Self::Prepared;

    fn render_layer(
        &self,
        layer: &LayerHandle,
        prepared: &Self::Prepared,
        slot: Size,
        view: View,
    ) -> Result<Vec<Renderable<Self::Feature>>, ViewError>;
}

/// Largest canvas, in pixels, the runtime will allocate.
pub const MAX_CANVAS_AREA: f64 = 16_777_216.0;

/// Renderables of every layer for one view width.
pub type Frame<F> = Vec<(LayerHandle, Vec<Renderable<F>>)>;

#[derive(Debug, Clone)]
pub enum TrackCommand {
    Render,
    Resize { width: f64, height: f64 },
    /// Preview a scroll by this fraction of the view width.
    Scroll(f64),
    /// Preview a zoom by this factor around the center.
    Zoom(f64),
    Shutdown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub renders_completed: u64,
    pub renders_cancelled: u64,
    /// Scroll and zoom previews shown since startup.
    pub previews: u64,
    /// Commands that failed and were skipped.
    pub errors: u64,
    pub cache: CacheStats,
}

type Shared<T> = Arc<RwLock<T>>;

/// Cloneable entry point for UI code. Every method is non-blocking.
#[derive(Debug)]
pub struct BrowserHandle<F, S> {
    view_tx: mpsc::UnboundedSender<ViewCommand>,
    cmd_tx: mpsc::UnboundedSender<TrackCommand>,
    view_rx: watch::Receiver<View>,
    hotspots: Shared<HotspotIndex<F>>,
    stats: Shared<FrameStats>,
    screen: Shared<Option<S>>,
    tasks: Arc<Mutex<Option<Tasks<F, S>>>>,
}

#[derive(Debug)]
struct Tasks<F, S> {
    view: JoinHandle<()>,
    main: JoinHandle<TrackContainer<S, F>>,
}

impl<F, S> Clone for BrowserHandle<F, S> {
    fn clone(&self) -> Self {
        Self {
            view_tx: self.view_tx.clone(),
            cmd_tx: self.cmd_tx.clone(),
            view_rx: self.view_rx.clone(),
            hotspots: Arc::clone(&self.hotspots),
            stats: Arc::clone(&self.stats),
            screen: Arc::clone(&self.screen),
            tasks: Arc::clone(&self.tasks),
        }
    }
}

impl<F: Clone, S> BrowserHandle<F, S> {
    pub fn queue_update_view(&self, cmd: ViewCommand) -> Result<(), BrowserError> {
        self.view_tx.send(cmd).map_err(|_| BrowserError::Closed)
    }

    pub fn queue_command(&self, cmd: TrackCommand) -> Result<(), BrowserError> {
        self.cmd_tx.send(cmd).map_err(|_| BrowserError::Closed)
    }

    /// The latest settled view.
    pub fn view(&self) -> View {
        *self.view_rx.borrow()
    }

    /// Features of the last frame whose glyphs lie within `radius` pixels of
    /// the container-relative `point`, nearest first.
    pub fn last_hotspots(&self, radius: f64, point: Point) -> Vec<F> {
        self.hotspots.read().hits(radius, point)
    }

    pub fn frame_stats(&self) -> FrameStats {
        *self.stats.read()
    }

    /// Run `f` on the most recently presented frame: every layer flattened
    /// after the last completed render, preview or resize. `None` until the
    /// first one.
    pub fn with_frame<R>(&self, f: impl FnOnce(&S) -> R) -> Option<R> {
        self.screen.read().as_ref().map(f)
    }

    /// Stop both tasks and hand back the container as it was last drawn.
    pub async fn shutdown(&self) -> Result<TrackContainer<S, F>, BrowserError> {
        let tasks = self.tasks.lock().take().ok_or(BrowserError::Closed)?;
        let _ = self.cmd_tx.send(TrackCommand::Shutdown);
        tasks.view.abort();
        tasks.main.await.map_err(|_| BrowserError::Closed)
    }
}

/// Start the runtime for `track` on a canvas of `size`.
///
/// Must be called from within a tokio runtime. The first frame is queued
/// right away.
pub fn spawn<T, S>(
    config: &BrowserConfig,
    coords: &CoordSys,
    track: T,
    size: Size,
) -> Result<BrowserHandle<T::Feature, S>, BrowserError>
where
    T: Track,
    S: Surface + Send + Sync + 'static,
{
    config.validate()?;
    check_size(size.width, size.height).map_err(|reason| ConfigError::InvalidValue {
        field: "canvas size",
        reason: reason.to_string(),
    })?;
    let limits = ViewLimits::for_coords(coords, config.view.min_width);
    let initial = normalize(config.initial_view(coords), limits);

    let dims = TrackDimensions::new(size, config.render.track_padding);
    let mut container = TrackContainer::new(dims, &config.render, config.labels.clone());
    let handles = track
        .layers()
        .into_iter()
        .map(|l| container.create_layer(l.name, l.kind, l.component))
        .collect();

    let (view_tx, view_cmds) = mpsc::unbounded_channel();
    let (cmd_tx, cmds) = mpsc::unbounded_channel();
    let (view_pub, view_rx) = watch::channel(initial);
    let hotspots: Shared<HotspotIndex<T::Feature>> = Arc::default();
    let stats: Shared<FrameStats> = Arc::default();
    let screen: Shared<Option<S>> = Arc::default();

    let view_task = ViewTask {
        commands: view_cmds,
        view: view_pub,
        queue: cmd_tx.clone(),
        limits,
        debounce: config.debounce(),
        max_previews: config.render.max_approximate_frames,
    };
    let main_loop = MainLoop {
        track,
        container,
        handles,
        cache: RenderCache::new(),
        view: view_rx.clone(),
        hotspots: Arc::clone(&hotspots),
        stats: Arc::clone(&stats),
        screen: Arc::clone(&screen),
    };

    cmd_tx.send(TrackCommand::Render).map_err(|_| BrowserError::Closed)?;
    let tasks = Tasks {
        view: tokio::spawn(view_task.run()),
        main: tokio::spawn(main_loop.run(cmds)),
    };
    info!(
        segments = coords.len(),
        low = initial.low,
        high = initial.high,
        "browser started"
    );

    Ok(BrowserHandle {
        view_tx,
        cmd_tx,
        view_rx,
        hotspots,
        stats,
        screen,
        tasks: Arc::new(Mutex::new(Some(tasks))),
    })
}

/// Draw `track` once at the configured initial view as a single vector
/// drawing, without starting the runtime.
pub fn snapshot<T: Track>(
    config: &BrowserConfig,
    coords: &CoordSys,
    track: &T,
    size: Size,
) -> Result<Drawing, BrowserError> {
    config.validate()?;
    let limits = ViewLimits::for_coords(coords, config.view.min_width);
    let view = normalize(config.initial_view(coords), limits);
    let dims = TrackDimensions::new(size, config.render.track_padding);
    // Only the layer bookkeeping is used; nothing is rasterized.
    let mut container: TrackContainer<RasterSurface, T::Feature> =
        TrackContainer::new(dims, &config.render, config.labels.clone());
    let prepared = track.prepare(&dims);

    let mut out = Drawing::empty();
    for spec in track.layers() {
        let handle = container.create_layer(spec.name, spec.kind, spec.component);
        let renderables = container.render(&handle, |slot| track.render_layer(&handle, &prepared, slot, view))??;
        let slot = dims.placement(spec.component).slot;
        let visible = visible_pixels(spec.kind, slot, view)?;
        out.push(container.vector(&handle, visible, &renderables)?);
    }
    debug!(commands = out.len(), "snapshot drawn");
    Ok(out)
}

fn check_size(width: f64, height: f64) -> Result<(), &'static str> {
    if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
        return Err("dimensions must be finite and non-negative");
    }
    if width * height > MAX_CANVAS_AREA {
        return Err("canvas too large");
    }
    Ok(())
}

/// Content pixels on screen for a layer of `kind` drawing into `slot`.
fn visible_pixels(kind: LayerType, slot: Size, view: View) -> Result<Interval<f64>, ViewError> {
    match kind {
        LayerType::Scrolling => Ok(LinearScale::for_view(slot.width, view)?.visible_pixels()),
        LayerType::Fixed => Ok(Interval::new(0.0, slot.width)),
    }
}

struct ViewTask {
    commands: mpsc::UnboundedReceiver<ViewCommand>,
    view: watch::Sender<View>,
    queue: mpsc::UnboundedSender<TrackCommand>,
    limits: ViewLimits,
    debounce: Duration,
    max_previews: u32,
}

impl ViewTask {
    async fn run(mut self) {
        let mut batch = ViewBatch::new();
        while let Some(first) = self.commands.recv().await {
            let mut previews = 0;
            let mut closed = false;
            self.collect(&mut batch, first, &mut previews);

            let deadline = sleep(self.debounce);
            tokio::pin!(deadline);
            while previews < self.max_previews || self.max_previews == 0 {
                tokio::select! {
                    biased;
                    cmd = self.commands.recv() => match cmd {
                        Some(cmd) => {
                            self.collect(&mut batch, cmd, &mut previews);
                            deadline.as_mut().reset(Instant::now() + self.debounce);
                        }
                        None => {
                            closed = true;
                            break;
                        }
                    },
                    () = &mut deadline => break,
                }
            }

            let merged = batch.len();
            let current = *self.view.borrow();
            let next = batch.apply(current, self.limits);
            self.view.send_replace(next);
            debug!(merged, previews, low = next.low, high = next.high, "view settled");
            if self.queue.send(TrackCommand::Render).is_err() || closed {
                break;
            }
        }
        trace!("view task stopped");
    }

    /// Queue `cmd` and, while previews are allowed, show it approximately.
    fn collect(&self, batch: &mut ViewBatch, cmd: ViewCommand, previews: &mut u32) {
        let preview = match &cmd {
            ViewCommand::Scroll(f) => Some(TrackCommand::Scroll(*f)),
            ViewCommand::Zoom(f) => Some(TrackCommand::Zoom(*f)),
            ViewCommand::Mod(_) => None,
        };
        batch.push(cmd);
        if let Some(p) = preview
            && self.max_previews > 0
            && self.queue.send(p).is_ok()
        {
            *previews += 1;
        }
    }
}

struct MainLoop<T: Track, S> {
    track: T,
    container: TrackContainer<S, T::Feature>,
    handles: Vec<LayerHandle>,
    cache: RenderCache<T::Prepared, Frame<T::Feature>>,
    view: watch::Receiver<View>,
    hotspots: Shared<HotspotIndex<T::Feature>>,
    stats: Shared<FrameStats>,
    screen: Shared<Option<S>>,
}

impl<T, S> MainLoop<T, S>
where
    T: Track,
    S: Surface + Send + Sync + 'static,
{
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<TrackCommand>) -> TrackContainer<S, T::Feature> {
        let mut pending: VecDeque<TrackCommand> = VecDeque::new();
        let mut closed = false;
        // The last pass was cancelled and the canvas is half drawn.
        let mut stale = false;
        loop {
            let cmd = match pending.pop_front() {
                Some(cmd) => cmd,
                None if closed => break,
                None => match commands.recv().await {
                    Some(cmd) => cmd,
                    None => break,
                },
            };
            trace!(?cmd, "track command");
            match cmd {
                TrackCommand::Shutdown => break,
                TrackCommand::Render => {
                    let cancel = CancelToken::new();
                    let view = *self.view.borrow();
                    let result = {
                        let pass = self.render(view, &cancel);
                        tokio::pin!(pass);
                        loop {
                            tokio::select! {
                                biased;
                                result = &mut pass => break result,
                                cmd = commands.recv(), if !closed => {
                                    match cmd {
                                        Some(cmd) => pending.push_back(cmd),
                                        None => closed = true,
                                    }
                                    cancel.cancel();
                                }
                            }
                        }
                    };
                    stale = matches!(result, Ok(DrawOutcome::Cancelled { .. }));
                    self.finish_render(result);
                }
                TrackCommand::Resize { width, height } => {
                    if let Err(reason) = self.resize(width, height) {
                        warn!(width, height, reason, "resize ignored");
                        self.stats.write().errors += 1;
                        redraw_if_stale(&mut pending, stale);
                        continue;
                    }
                    // Render after everything already queued.
                    while let Ok(cmd) = commands.try_recv() {
                        pending.push_back(cmd);
                    }
                    pending.push_back(TrackCommand::Render);
                }
                TrackCommand::Scroll(fraction) => {
                    let width = self.container.dims().padded().w;
                    self.container.scroll(-fraction * width);
                    self.preview_shown();
                }
                TrackCommand::Zoom(factor) => {
                    if !factor.is_finite() || factor <= 0.0 {
                        debug!(factor, "zoom preview ignored");
                        redraw_if_stale(&mut pending, stale);
                        continue;
                    }
                    self.container.zoom(0.5 - factor / 2.0, 0.5 + factor / 2.0);
                    self.preview_shown();
                }
            }
        }
        debug!("main loop stopped");
        self.container
    }

    fn resize(&mut self, width: f64, height: f64) -> Result<(), &'static str> {
        check_size(width, height)?;
        self.container.resize(Size::new(width, height));
        self.present();
        Ok(())
    }

    fn preview_shown(&mut self) {
        self.present();
        self.stats.write().previews += 1;
    }

    /// Publish the container's current pixels and hotspots to the handle.
    fn present(&mut self) {
        *self.hotspots.write() = self.container.hotspots().clone();
        *self.screen.write() = Some(self.container.composite());
    }

    async fn render(&mut self, view: View, cancel: &CancelToken) -> Result<DrawOutcome, BrowserError> {
        let dims = self.container.dims();
        let track = &self.track;
        let container = &self.container;
        let handles = &self.handles;
        let frame = self.cache.try_get(
            dims,
            view,
            |d| Ok::<_, BrowserError>(track.prepare(d)),
            |prepared, _, view| {
                let mut frame = Vec::with_capacity(handles.len());
                for h in handles {
                    let renderables = container.render(h, |slot| track.render_layer(h, prepared, slot, view))??;
                    frame.push((h.clone(), renderables));
                }
                Ok(frame)
            },
        )?;
        self.stats.write().cache = self.cache.stats();

        self.container.begin_frame();
        let mut chunks = 0;
        for (handle, renderables) in frame.iter() {
            let visible = self.visible_pixels(handle, view)?;
            match self
                .container
                .draw_on_canvas(handle, visible, renderables, cancel)
                .await?
            {
                DrawOutcome::Completed { chunks: n } => chunks += n,
                DrawOutcome::Cancelled { chunks: n } => {
                    return Ok(DrawOutcome::Cancelled { chunks: chunks + n });
                }
            }
        }
        Ok(DrawOutcome::Completed { chunks })
    }

    /// Content pixels on screen for `handle`'s layer.
    fn visible_pixels(&self, handle: &LayerHandle, view: View) -> Result<Interval<f64>, BrowserError> {
        let layer = self.container.layer(handle.name())?;
        let slot = self.container.dims().placement(layer.component()).slot;
        Ok(visible_pixels(layer.kind(), slot, view)?)
    }

    fn finish_render(&mut self, result: Result<DrawOutcome, BrowserError>) {
        if matches!(result, Ok(DrawOutcome::Completed { .. })) {
            self.present();
        } else {
            *self.hotspots.write() = self.container.hotspots().clone();
        }
        let mut stats = self.stats.write();
        match result {
            Ok(DrawOutcome::Completed { chunks }) => {
                stats.renders_completed += 1;
                debug!(chunks, glyphs = self.container.hotspots().len(), "render completed");
            }
            Ok(DrawOutcome::Cancelled { chunks }) => {
                stats.renders_cancelled += 1;
                debug!(chunks, "render cancelled");
            }
            Err(err) => {
                stats.errors += 1;
                warn!(error = %err, "render failed");
            }
        }
    }
}

/// Queue a redraw after a cancelled pass when the command that cancelled it
/// turned out to do nothing.
fn redraw_if_stale(pending: &mut VecDeque<TrackCommand>, stale: bool) {
    let queued = pending
        .iter()
        .any(|c| matches!(c, TrackCommand::Render | TrackCommand::Resize { .. }));
    if stale && !queued {
        pending.push_back(TrackCommand::Render);
    }
}
