use image::GrayImage;
use crate::{error::Result, types::{Contour, Keypoint}};

/// Trait for mask preparation stages (blur, threshold, morphology)
pub trait ImagePreprocessor: Send + Sync {
    /// Transform a grayscale image; stages are chained in order
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage>;
}

/// Trait for contour extraction algorithms
pub trait ContourExtractor: Send + Sync {
    /// Extract closed outer contours from a binary mask (non-zero = foreground)
    fn extract_contours(&self, mask: &GrayImage) -> Result<Vec<Contour>>;
}

/// Trait for corner keypoint detectors
pub trait CornerDetector: Send + Sync {
    /// Detect corners in a grayscale image
    fn detect_corners(&self, image: &GrayImage) -> Result<Vec<Keypoint>>;
}
