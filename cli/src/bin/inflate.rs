use std::path::PathBuf;

use clap::Parser;
use cli::{convert_directory, ConvertOptions, Strategy};
use color_eyre::eyre::Result;
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(version, about = "Inflate black/white raster markers into laser-cuttable SVG outlines", long_about = None)]
struct Cli {
    /// Directory of source images
    directory: PathBuf,

    /// Scale factor for images
    #[arg(short, long, default_value_t = 100)]
    scale: u32,

    /// Margin on output images
    #[arg(short, long, default_value_t = 10)]
    margin: u32,

    /// Threshold separating foreground from background
    #[arg(short, long, default_value_t = 128)]
    threshold: u8,

    /// Invert source images
    #[arg(short, long)]
    invert: bool,

    /// Contour extraction strategy
    #[arg(long, value_enum, default_value = "trace")]
    strategy: Strategy,

    /// Colour each region from a debug palette instead of black
    #[arg(long)]
    region_colors: bool,

    /// Extra Douglas-Peucker simplification tolerance, in pixel units
    #[arg(long)]
    simplify: Option<f32>,

    /// Also write a GeoJSON sidecar per image
    #[arg(long)]
    geojson: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let options = ConvertOptions {
        scale: cli.scale,
        margin: cli.margin,
        threshold: cli.threshold,
        invert: cli.invert,
        strategy: cli.strategy,
        region_colors: cli.region_colors,
        simplify: cli.simplify,
        geojson: cli.geojson,
    };

    let outputs = convert_directory(&cli.directory, &options)?;
    info!(converted = outputs.len(), "conversion completed");

    Ok(())
}
