//! View state and the update protocol.
//!
//! A view is the visible `[low, high)` slice of the global axis. It only
//! changes through [`step`], which applies a [`ViewCommand`] and then
//! [`normalize`]s the result against the [`ViewLimits`].

use std::fmt;
use std::sync::Arc;

use genoview_protocol::Interval;

use crate::coords::CoordSys;

pub type View = Interval<f64>;

/// Arbitrary view transform used for jumps and resets.
pub type ViewFn = Arc<dyn Fn(View) -> View + Send + Sync>;

#[derive(Clone)]
pub enum ViewCommand {
    /// Shift by this fraction of the current width. Negative moves left.
    Scroll(f64),
    /// Rescale around the center. Below 1 zooms in.
    Zoom(f64),
    Mod(ViewFn),
}

impl ViewCommand {
    pub fn modify(f: impl Fn(View) -> View + Send + Sync + 'static) -> Self {
        ViewCommand::Mod(Arc::new(f))
    }

    /// Jump straight to `target`.
    pub fn jump(target: View) -> Self {
        Self::modify(move |_| target)
    }

    /// Recenter on `at`, keeping the current width.
    pub fn center_on(at: f64) -> Self {
        Self::modify(move |v| v.translate(at - v.center()))
    }

    fn kind(&self) -> &'static str {
        match self {
            ViewCommand::Scroll(_) => "scroll",
            ViewCommand::Zoom(_) => "zoom",
            ViewCommand::Mod(_) => "mod",
        }
    }
}

impl fmt::Debug for ViewCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewCommand::Scroll(x) => f.debug_tuple("Scroll").field(x).finish(),
            ViewCommand::Zoom(x) => f.debug_tuple("Zoom").field(x).finish(),
            ViewCommand::Mod(_) => f.write_str("Mod(..)"),
        }
    }
}

/// Bounds every view must respect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewLimits {
    pub total: f64,
    pub min_width: f64,
}

impl ViewLimits {
    pub fn new(total: f64, min_width: f64) -> Self {
        Self { total, min_width }
    }

    pub fn for_coords(coords: &CoordSys, min_width: f64) -> Self {
        Self::new(coords.total_size() as f64, min_width)
    }

    pub fn bounds(&self) -> View {
        Interval::new(0.0, self.total)
    }
}

/// The command's transform without normalization.
pub fn apply(cmd: &ViewCommand, view: View) -> View {
    match cmd {
        ViewCommand::Scroll(fraction) if fraction.is_finite() => {
            view.translate(fraction * view.size())
        }
        ViewCommand::Zoom(factor) if factor.is_finite() && *factor > 0.0 => {
            view.scale_around_center(*factor)
        }
        ViewCommand::Mod(f) => f(view),
        _ => view,
    }
}

/// Apply `cmd` to `view` and normalize the result.
pub fn step(cmd: &ViewCommand, view: View, limits: ViewLimits) -> View {
    normalize(apply(cmd, view), limits)
}

/// Force `view` into `[0, total]` with at least `min_width` units visible.
///
/// Narrow views widen around their center. Views hanging over either end
/// shift inward with their width intact. If the floor does not fit in the
/// axis the result is the whole axis.
pub fn normalize(view: View, limits: ViewLimits) -> View {
    let bounds = limits.bounds();
    if !view.low.is_finite() || !view.high.is_finite() || limits.min_width >= limits.total {
        return bounds;
    }
    let view = Interval::spanning(view.low, view.high);
    let view = if view.size() < limits.min_width {
        view.with_width_centered(limits.min_width)
    } else {
        view
    };
    view.shift_into(&bounds)
}

/// View commands waiting out the debounce window.
///
/// Consecutive scrolls add, consecutive zooms multiply, and a `Mod` drops
/// everything queued before it. A scroll after a zoom (or the reverse) is
/// kept as a separate step so the order of effects is preserved.
#[derive(Debug, Default, Clone)]
pub struct ViewBatch {
    pending: Vec<ViewCommand>,
}

impl ViewBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: ViewCommand) {
        let merged = match (self.pending.last_mut(), &cmd) {
            (Some(ViewCommand::Scroll(a)), ViewCommand::Scroll(b)) => {
                *a += b;
                true
            }
            (Some(ViewCommand::Zoom(a)), ViewCommand::Zoom(b)) => {
                *a *= b;
                true
            }
            _ => false,
        };
        if merged {
            return;
        }
        if matches!(cmd, ViewCommand::Mod(_)) {
            self.pending.clear();
        }
        self.pending.push(cmd);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Run every merged command against `view`, normalizing after each.
    pub fn apply(&mut self, view: View, limits: ViewLimits) -> View {
        let pending = std::mem::take(&mut self.pending);
        pending.iter().fold(view, |v, cmd| {
            let next = step(cmd, v, limits);
            tracing::trace!(kind = cmd.kind(), low = next.low, high = next.high, "view step");
            next
        })
    }
}
