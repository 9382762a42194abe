use crate::{
    algorithms::{
        ContourValidator, CrackTraceExtractor, DouglasPeuckerSimplifier, EvenOddNester,
        GridMergeExtractor, InvertPreprocessor, ThresholdPreprocessor, WorklistMergeExtractor,
    },
    pipeline::Pipeline,
    traits::{ContourExtractor, ContourNester, ContourPostProcessor, ImagePreprocessor},
};

/// Builder for creating processing pipelines with a fluent API
pub struct PipelineBuilder {
    preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    extractor: Option<Box<dyn ContourExtractor>>,
    nester: Option<Box<dyn ContourNester>>,
    postprocessors: Vec<Box<dyn ContourPostProcessor>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            preprocessors: Vec::new(),
            extractor: None,
            nester: None,
            postprocessors: Vec::new(),
        }
    }

    /// Add a preprocessor to the pipeline
    pub fn add_preprocessor<P>(mut self, preprocessor: P) -> Self
    where
        P: ImagePreprocessor + 'static,
    {
        self.preprocessors.push(Box::new(preprocessor));
        self
    }

    /// Set the contour extractor (replaces any existing one)
    pub fn set_extractor<E>(mut self, extractor: E) -> Self
    where
        E: ContourExtractor + 'static,
    {
        self.extractor = Some(Box::new(extractor));
        self
    }

    /// Set the nesting resolver (replaces any existing one)
    pub fn set_nester<N>(mut self, nester: N) -> Self
    where
        N: ContourNester + 'static,
    {
        self.nester = Some(Box::new(nester));
        self
    }

    /// Add a post-processor to the pipeline
    pub fn add_postprocessor<P>(mut self, postprocessor: P) -> Self
    where
        P: ContourPostProcessor + 'static,
    {
        self.postprocessors.push(Box::new(postprocessor));
        self
    }

    /// Threshold the source image before building the pixel grid
    pub fn with_threshold(self, threshold: u8) -> Self {
        self.add_preprocessor(ThresholdPreprocessor { threshold })
    }

    /// Swap foreground and background after thresholding
    pub fn with_invert(self) -> Self {
        self.add_preprocessor(InvertPreprocessor)
    }

    /// Use the crack-tracing extraction strategy (the default)
    pub fn with_tracer(self) -> Self {
        self.set_extractor(CrackTraceExtractor)
    }

    /// Use the directional boolean-merge extraction strategy
    pub fn with_merge(self) -> Self {
        self.set_extractor(GridMergeExtractor::default())
    }

    /// Use the worklist boolean-merge extraction strategy
    pub fn with_worklist_merge(self) -> Self {
        self.set_extractor(WorklistMergeExtractor::default())
    }

    /// Add Douglas-Peucker simplification as a post-processing step
    pub fn with_simplification(self, tolerance: f32) -> Self {
        self.add_postprocessor(DouglasPeuckerSimplifier { tolerance })
    }

    /// Add contour validation as a post-processing step
    pub fn with_validation(self) -> Self {
        self.add_postprocessor(ContourValidator)
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> Pipeline {
        let extractor = self
            .extractor
            .unwrap_or_else(|| Box::new(CrackTraceExtractor));

        let nester = self.nester.unwrap_or_else(|| Box::new(EvenOddNester));

        Pipeline::new(self.preprocessors, extractor, nester, self.postprocessors)
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
