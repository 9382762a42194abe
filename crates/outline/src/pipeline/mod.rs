pub mod builder;

use crate::{
    error::Result,
    traits::{ContourExtractor, ContourNester, ContourPostProcessor, ImagePreprocessor},
    types::{ContourSet, PixelGrid},
};
use image::GrayImage;

/// A flexible pipeline for outline extraction with multiple processing stages
pub struct Pipeline {
    preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    extractor: Box<dyn ContourExtractor>,
    nester: Box<dyn ContourNester>,
    postprocessors: Vec<Box<dyn ContourPostProcessor>>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Create a new pipeline with the given components
    pub fn new(
        preprocessors: Vec<Box<dyn ImagePreprocessor>>,
        extractor: Box<dyn ContourExtractor>,
        nester: Box<dyn ContourNester>,
        postprocessors: Vec<Box<dyn ContourPostProcessor>>,
    ) -> Self {
        Self {
            preprocessors,
            extractor,
            nester,
            postprocessors,
        }
    }

    /// Process an image through the entire pipeline
    pub fn process(&self, image: &GrayImage) -> Result<ContourSet> {
        // Step 1: Apply all preprocessors in sequence
        let mut processed = image.clone();
        for preprocessor in &self.preprocessors {
            processed = preprocessor.preprocess(&processed)?;
        }

        // Step 2: Build the boolean grid and run the remaining stages
        let grid = PixelGrid::from_binary_image(&processed);
        let mut set = self.process_grid(&grid)?;
        set.image_width = image.width();
        set.image_height = image.height();
        Ok(set)
    }

    /// Run extraction, nesting and post-processing on an existing grid,
    /// skipping image preprocessing.
    pub fn process_grid(&self, grid: &PixelGrid) -> Result<ContourSet> {
        let rings = self.extractor.extract_rings(grid)?;
        let mut contours = self.nester.resolve(rings)?;

        for postprocessor in &self.postprocessors {
            postprocessor.process(&mut contours)?;
        }

        // Drop contours invalidated by post-processing
        contours.retain(|contour| !contour.ring.is_empty());

        Ok(ContourSet {
            contours,
            image_width: grid.width(),
            image_height: grid.height(),
        })
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "Pipeline: {} preprocessors, 1 extractor, 1 nester, {} postprocessors",
            self.preprocessors.len(),
            self.postprocessors.len()
        )
    }
}
