mod demo;
mod logging;
mod renderer;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use genoview_core::views::{Annotation, Snp};
use genoview_core::{BrowserConfig, CoordSys, FeatureRecord, FeatureSet, GenomeBrowser, feature_channel};
use genoview_protocol::{Padding, Size};
use serde::de::DeserializeOwned;
use tracing::info;

/// Records sent per chunk while streaming features into the browser.
const LOAD_CHUNK: usize = 4096;

/// Terminal genome browser for GWAS results.
#[derive(Debug, Parser)]
#[command(name = "genoview", version)]
struct Args {
    /// GWAS results as JSON feature records; built-in demo data if omitted
    gwas: Option<PathBuf>,

    /// Browser configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Gene annotations as JSON feature records
    #[arg(long)]
    genes: Option<PathBuf>,

    /// Log file path
    #[arg(long, default_value = "genoview.log")]
    log: PathBuf,

    /// Log at debug level
    #[arg(long)]
    debug: bool,

    /// Write the initial view as SVG to this file instead of opening the browser
    #[arg(long, value_name = "FILE")]
    export_svg: Option<PathBuf>,

    /// SVG width in pixels
    #[arg(long, default_value_t = 1200.0, requires = "export_svg")]
    width: f64,

    /// SVG height in pixels
    #[arg(long, default_value_t = 400.0, requires = "export_svg")]
    height: f64,

    /// Use the light palette for SVG export
    #[arg(long, requires = "export_svg")]
    light: bool,
}

/// Defaults sized for terminal cells rather than pixels.
fn terminal_config() -> BrowserConfig {
    let mut c = BrowserConfig::default();
    c.render.glyph_buffer = Size::new(1.0, 1.0);
    c.render.track_padding = Padding::new(8.0, 1.0, 1.0, 1.0);
    c.labels.text_height = 1.0;
    c.labels.gravity_padding = 1.0;
    c.labels.char_width = 1.0;
    c.labels.visible_margin = 4.0;
    c.labels.font_size = 1.0;
    c.gwas.glyph_radius = 0.0;
    c.gwas.label_top_n = 5;
    c
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("cannot parse {}", path.display()))
}

/// Stream `records` through a feature channel in chunks and build the set.
async fn load<P: Send + 'static>(coords: &CoordSys, records: Vec<FeatureRecord<P>>) -> Result<FeatureSet<P>> {
    let (tx, loader) = feature_channel(4);
    let producer = tokio::spawn(async move {
        let mut records = records.into_iter();
        loop {
            let chunk: Vec<_> = records.by_ref().take(LOAD_CHUNK).collect();
            if chunk.is_empty() || tx.send(chunk).await.is_err() {
                break;
            }
        }
    });
    let (set, dropped) = loader.collect(coords).await;
    producer.await?;
    info!(features = set.len(), dropped, "features loaded");
    Ok(set)
}

/// Draw the initial view of `browser` as an SVG file.
fn export_svg(
    config: &BrowserConfig,
    coords: &CoordSys,
    browser: &GenomeBrowser<Snp>,
    size: Size,
    dark: bool,
    path: &Path,
) -> Result<()> {
    let drawing = genoview_core::runtime::snapshot(config, coords, browser, size)?;
    let svg = genoview_core::svg::render_svg(&drawing, size, dark);
    std::fs::write(path, svg).with_context(|| format!("cannot write {}", path.display()))?;
    info!(path = %path.display(), commands = drawing.len(), "svg exported");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.debug, &args.log)?;

    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
            BrowserConfig::from_json(&text)?
        }
        // exports are sized in pixels, the terminal in cells
        None if args.export_svg.is_some() => BrowserConfig::default(),
        None => terminal_config(),
    };
    let coords = Arc::new(config.coord_sys()?);
    info!(segments = coords.len(), total = coords.total_size(), "coordinate system built");

    let snps: Vec<FeatureRecord<Snp>> = match &args.gwas {
        Some(path) => read_json(path)?,
        None => demo::snps(&coords),
    };
    let genes: Vec<FeatureRecord<Annotation>> = match &args.genes {
        Some(path) => read_json(path)?,
        None if args.gwas.is_none() => demo::genes(),
        None => Vec::new(),
    };

    let browser = GenomeBrowser::new(Arc::clone(&coords), config.gwas.clone())
        .with_snps(load(&coords, snps).await?)
        .with_annotations(load(&coords, genes).await?);

    if let Some(path) = &args.export_svg {
        let size = Size::new(args.width, args.height);
        return export_svg(&config, &coords, &browser, size, !args.light, path);
    }
    renderer::run_tui(&config, coords, browser).await
}
