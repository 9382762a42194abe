//! # Raster Outline Inflation Library
//!
//! Converts binary (black/white) raster images into closed vector contours
//! whose filled union reproduces the foreground pixels exactly. Built for
//! laser-cutting and plotting inflated physical markers, where every
//! foreground pixel must end up inside a cut path and every enclosed
//! background pixel inside a hole.
//!
//! ## Core Features
//!
//! - **Two extraction strategies**: a crack-following region tracer that
//!   needs no boolean geometry, and a polygon merge engine that unions
//!   per-pixel unit squares and reports enclosed holes
//! - **Even-odd nesting**: containment-tree classification of solid contours
//!   vs. holes, emitted in painter-friendly order
//! - **Pipeline system**: compose preprocessing, extraction, nesting and
//!   post-processing steps behind one fluent builder
//! - **SVG and GeoJSON output**: scaled, margined cut documents or standard
//!   feature collections
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use outline::{Pipeline, SvgOptions};
//! use image::open;
//!
//! let pipeline = Pipeline::builder()
//!     .with_threshold(128)
//!     .build();
//!
//! let image = open("marker.png")?.to_luma8();
//! let result = pipeline.process(&image)?;
//!
//! result.save_svg("marker.svg", &SvgOptions::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Pipeline
//!
//! ```rust,no_run
//! use outline::Pipeline;
//!
//! let pipeline = Pipeline::builder()
//!     .with_threshold(150)
//!     .with_invert()
//!     .with_merge()
//!     .with_simplification(0.5)
//!     .build();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod algorithms;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use algorithms::*;
pub use error::{OutlineError, Result};
pub use io::{SvgOptions, REGION_PALETTE};
pub use pipeline::{builder::PipelineBuilder, Pipeline};
pub use traits::*;
pub use types::{Contour, ContourSet, PixelGrid, Ring};

/// Type aliases for common extractor configurations
pub type TracedExtractor =
    StandardOutlineExtractor<ThresholdPreprocessor, CrackTraceExtractor, SolidNester>;

pub type MergedExtractor =
    StandardOutlineExtractor<ThresholdPreprocessor, GridMergeExtractor, EvenOddNester>;

/// Standard outline extractor implementation
#[derive(Debug)]
pub struct StandardOutlineExtractor<P, C, N>
where
    P: ImagePreprocessor,
    C: ContourExtractor,
    N: ContourNester,
{
    pub preprocessor: P,
    pub extractor: C,
    pub nester: N,
}

impl<P, C, N> StandardOutlineExtractor<P, C, N>
where
    P: ImagePreprocessor,
    C: ContourExtractor,
    N: ContourNester,
{
    pub fn new(preprocessor: P, extractor: C, nester: N) -> Self {
        Self {
            preprocessor,
            extractor,
            nester,
        }
    }
}

impl<P, C, N> OutlineExtractor for StandardOutlineExtractor<P, C, N>
where
    P: ImagePreprocessor,
    C: ContourExtractor,
    N: ContourNester,
{
    fn extract_outline(&self, image: &image::GrayImage) -> Result<ContourSet> {
        let binary = self.preprocessor.preprocess(image)?;
        let grid = PixelGrid::from_binary_image(&binary);
        let rings = self.extractor.extract_rings(&grid)?;
        let contours = self.nester.resolve(rings)?;
        Ok(ContourSet {
            contours,
            image_width: image.width(),
            image_height: image.height(),
        })
    }
}

impl Default for TracedExtractor {
    fn default() -> Self {
        Self::new(
            ThresholdPreprocessor::default(),
            CrackTraceExtractor,
            SolidNester,
        )
    }
}

impl Default for MergedExtractor {
    fn default() -> Self {
        Self::new(
            ThresholdPreprocessor::default(),
            GridMergeExtractor::default(),
            EvenOddNester,
        )
    }
}
