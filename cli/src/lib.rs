use std::path::{Path, PathBuf};

use clap::ValueEnum;
use outline::{Pipeline, Result, SvgOptions};
use tracing::{debug, info, warn};

/// Contour extraction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Crack-following region tracer; fast, but sees no holes
    Trace,
    /// Directional boolean merge of unit squares; reports holes
    Merge,
    /// Worklist boolean merge with the contiguous-touch guard
    Worklist,
}

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub scale: u32,
    pub margin: u32,
    pub threshold: u8,
    pub invert: bool,
    pub strategy: Strategy,
    pub region_colors: bool,
    pub simplify: Option<f32>,
    pub geojson: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            scale: 100,
            margin: 10,
            threshold: 128,
            invert: false,
            strategy: Strategy::Trace,
            region_colors: false,
            simplify: None,
            geojson: false,
        }
    }
}

/// Assemble the processing pipeline described by the options.
pub fn build_pipeline(options: &ConvertOptions) -> Pipeline {
    let mut builder = Pipeline::builder().with_threshold(options.threshold);
    if options.invert {
        builder = builder.with_invert();
    }
    builder = match options.strategy {
        Strategy::Trace => builder.with_tracer(),
        Strategy::Merge => builder.with_merge(),
        Strategy::Worklist => builder.with_worklist_merge(),
    };
    if let Some(tolerance) = options.simplify {
        builder = builder.with_simplification(tolerance);
    }
    builder.with_validation().build()
}

/// Convert one raster image to an SVG cut document next to it. Returns the
/// path of the written SVG.
pub fn convert_image(input: &Path, options: &ConvertOptions) -> Result<PathBuf> {
    let image = image::open(input)?.to_luma8();
    let pipeline = build_pipeline(options);
    debug!(pipeline = %pipeline.info(), "assembled pipeline");
    let result = pipeline.process(&image)?;
    info!(
        input = %input.display(),
        contours = result.contours.len(),
        holes = result.hole_count(),
        "extracted outline"
    );

    let svg_options = SvgOptions {
        scale: options.scale,
        margin: options.margin,
        region_colors: options.region_colors,
    };
    let output = input.with_extension("svg");
    result.save_svg(&output, &svg_options)?;

    if options.geojson {
        result.save_geojson(input.with_extension("geojson"))?;
    }
    Ok(output)
}

/// Convert every PNG in a directory, skipping images that fail to convert.
pub fn convert_directory(directory: &Path, options: &ConvertOptions) -> Result<Vec<PathBuf>> {
    let mut inputs: Vec<PathBuf> = std::fs::read_dir(directory)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
        })
        .collect();
    inputs.sort();

    let mut outputs = Vec::new();
    for input in inputs {
        match convert_image(&input, options) {
            Ok(output) => outputs.push(output),
            Err(error) => warn!(input = %input.display(), %error, "skipping image"),
        }
    }
    Ok(outputs)
}
