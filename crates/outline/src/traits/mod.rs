use crate::{
    error::Result,
    types::{Contour, ContourSet, PixelGrid, Ring},
};
use image::GrayImage;

/// Trait for image preprocessing algorithms
pub trait ImagePreprocessor: Send + Sync {
    /// Preprocess the input image (e.g., threshold, invert)
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage>;
}

/// Trait for contour extraction strategies
pub trait ContourExtractor: Send + Sync {
    /// Extract closed boundary rings from a binary pixel grid
    fn extract_rings(&self, grid: &PixelGrid) -> Result<Vec<Ring>>;
}

/// Trait for nesting resolution: classify rings as solid or hole and order
/// them for rendering
pub trait ContourNester: Send + Sync {
    fn resolve(&self, rings: Vec<Ring>) -> Result<Vec<Contour>>;
}

/// Trait for contour post-processing algorithms
pub trait ContourPostProcessor: Send + Sync {
    fn process(&self, contours: &mut [Contour]) -> Result<()>;
}

/// Main trait for outline extraction
pub trait OutlineExtractor: Send + Sync {
    /// Extract the full classified outline from a grayscale image
    fn extract_outline(&self, image: &GrayImage) -> Result<ContourSet>;
}
