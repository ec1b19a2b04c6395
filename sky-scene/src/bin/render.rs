use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use sky_catalog::{CatalogStore, StarSource, TextCatalog};
use sky_core::{Hemisphere, Point, Size};
use sky_scene::{render_svg, ColorScheme, SceneConfig, SkyRenderModel};
use tracing::{info, warn, Level};

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Svg,
    Json,
}

#[derive(Parser)]
#[command(name = "render-sky")]
#[command(about = "Render a hemisphere star chart from an HYG catalog")]
struct Cli {
    /// Path to the catalog file
    #[arg(long)]
    catalog: PathBuf,

    /// Treat the catalog as an SQLite database
    #[cfg(feature = "sqlite")]
    #[arg(long)]
    sqlite: bool,

    /// Output file
    #[arg(long, short)]
    output: PathBuf,

    #[arg(long, value_enum, default_value = "svg")]
    format: OutputFormat,

    #[arg(long, default_value = "800")]
    width: f64,

    #[arg(long, default_value = "800")]
    height: f64,

    #[arg(long, default_value = "north")]
    hemisphere: Hemisphere,

    /// Exclusive magnitude limit (defaults to the scene config value)
    #[arg(long)]
    max_mag: Option<f64>,

    /// Zoom factor, clamped to the configured bounds
    #[arg(long, default_value = "1.0")]
    zoom: f64,

    /// Horizontal pan in screen units, positive to the right
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    pan_x: f64,

    /// Vertical pan in screen units, positive downwards
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    pan_y: f64,

    /// Scene config JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Color scheme JSON
    #[arg(long)]
    colors: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => SceneConfig::from_json_file(path)?,
        None => SceneConfig::default(),
    };
    let colors = match &cli.colors {
        Some(path) => ColorScheme::from_json_file(path)?,
        None => ColorScheme::default(),
    };

    let source = catalog_source(&cli);
    let catalog = match CatalogStore::open(source.as_ref()) {
        Ok((store, _)) => store,
        Err(err) => {
            warn!("rendering without stars: {}", err);
            CatalogStore::new()
        }
    };

    let size = Size::new(cli.width, cli.height);
    let mut model = SkyRenderModel::new(size, config, colors, catalog)
        .context("Cannot build sky scene")?;

    model.set_hemisphere(cli.hemisphere);
    if let Some(max_mag) = cli.max_mag {
        model.set_magnitude_threshold(max_mag);
    }

    model.on_pinch_begin();
    model.on_pinch_update(cli.zoom, None);
    model.on_pinch_end();

    model.on_pan_begin();
    model.on_pan_update(Point::new(cli.pan_x, cli.pan_y));
    model.on_pan_end();

    let frame = model.frame();
    let document = match cli.format {
        OutputFormat::Svg => render_svg(frame)?,
        OutputFormat::Json => serde_json::to_string_pretty(frame)?,
    };
    fs::write(&cli.output, document)
        .with_context(|| format!("Cannot write {}", cli.output.display()))?;

    info!(
        stars = frame.stats.stars,
        skipped = frame.stats.skipped_unprojectable,
        zoom = frame.zoom,
        "wrote {}",
        cli.output.display()
    );
    Ok(())
}

fn catalog_source(cli: &Cli) -> Box<dyn StarSource> {
    #[cfg(feature = "sqlite")]
    if cli.sqlite {
        return Box::new(sky_catalog::SqliteCatalog::new(&cli.catalog));
    }
    Box::new(TextCatalog::from_path(&cli.catalog))
}
