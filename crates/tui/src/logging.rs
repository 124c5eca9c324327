use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Send logs to `path`; the terminal belongs to the UI.
///
/// Without `debug` the level is fixed at `info`. With it, `RUST_LOG` may
/// override the `debug` default.
pub fn init(debug: bool, path: &Path) -> Result<()> {
    let level = if debug { "debug" } else { "info" };
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let file = File::create(path).with_context(|| format!("cannot create log file {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}
