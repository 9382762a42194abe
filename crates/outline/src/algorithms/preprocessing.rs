use crate::{error::Result, traits::ImagePreprocessor};
use image::GrayImage;

/// Simple thresholding preprocessor
#[derive(Debug, Clone)]
pub struct ThresholdPreprocessor {
    pub threshold: u8,
}

impl Default for ThresholdPreprocessor {
    fn default() -> Self {
        Self { threshold: 128 }
    }
}

impl ImagePreprocessor for ThresholdPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        Ok(imageproc::contrast::threshold(
            image,
            self.threshold,
            imageproc::contrast::ThresholdType::Binary,
        ))
    }
}

/// Swaps foreground and background. Source images with light markers on a
/// dark ground run through this after thresholding.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvertPreprocessor;

impl ImagePreprocessor for InvertPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        let mut inverted = image.clone();
        image::imageops::invert(&mut inverted);
        Ok(inverted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn threshold_splits_at_the_configured_level() {
        let mut img = GrayImage::new(2, 1);
        img.put_pixel(0, 0, Luma([100u8]));
        img.put_pixel(1, 0, Luma([200u8]));

        let binary = ThresholdPreprocessor { threshold: 128 }
            .preprocess(&img)
            .expect("thresholding succeeds");
        assert_eq!(binary.get_pixel(0, 0).0[0], 0);
        assert_eq!(binary.get_pixel(1, 0).0[0], 255);
    }

    #[test]
    fn invert_flips_binary_pixels() {
        let mut img = GrayImage::new(2, 1);
        img.put_pixel(0, 0, Luma([0u8]));
        img.put_pixel(1, 0, Luma([255u8]));

        let flipped = InvertPreprocessor
            .preprocess(&img)
            .expect("inversion succeeds");
        assert_eq!(flipped.get_pixel(0, 0).0[0], 255);
        assert_eq!(flipped.get_pixel(1, 0).0[0], 0);
    }
}
