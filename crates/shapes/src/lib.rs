//! # Shape Detection Library
//!
//! Extracts closed outlines from a raster image, reduces each outline to a
//! minimal polygon and labels it (triangle, quadrilateral, ..., circle).
//!
//! Two classification strategies are available:
//!
//! - **Vertex count**: the convex hull of every contour is simplified with
//!   Ramer-Douglas-Peucker, near-duplicate points are filtered and merged, and
//!   the remaining vertex count is looked up in a label table.
//! - **Corner count**: Harris or Shi-Tomasi corners are detected on the
//!   grayscale image and every contour is labelled by how many of them it
//!   encloses.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shapes::{detect_and_classify_polygons, DetectorConfig};
//!
//! let image = image::open("shapes.png")?;
//! let (annotated, detection) = detect_and_classify_polygons(&image, &DetectorConfig::default())?;
//!
//! for shape in &detection.shapes {
//!     println!("{} at ({:.0}, {:.0})", shape.label, shape.centroid.x, shape.centroid.y);
//! }
//! annotated.save("annotated.png")?;
//! detection.save_geojson("shapes.geojson")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Corner Counting
//!
//! ```rust,no_run
//! use shapes::{detect_and_draw_diagonals, find_corners_with_harris, DetectorConfig};
//!
//! let image = image::open("shapes.png")?;
//! let (corners, contours) = find_corners_with_harris(&image, &DetectorConfig::default())?;
//! let (annotated, detection) = detect_and_draw_diagonals(&image, &corners, &contours)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod config;
pub mod command;
pub mod annotate;
pub mod io;
pub mod typed_geojson;

pub use error::{Result, ShapeError};
pub use types::*;
pub use traits::*;
pub use algorithms::*;
pub use pipeline::{builder::PipelineBuilder, label_contours_by_corners, Pipeline};
pub use config::*;
pub use command::{execute, ShapeCommand};
pub use annotate::annotate;

use image::{DynamicImage, RgbImage};

/// Vertex-count classification of every outline in `image`, returning an
/// annotated copy alongside the detection.
pub fn detect_and_classify_polygons(
    image: &DynamicImage,
    config: &DetectorConfig,
) -> Result<(RgbImage, Detection)> {
    let detection = PipelineBuilder::build_for_polygons(config).classify_polygons(&image.to_luma8())?;
    Ok((annotate(&image.to_rgb8(), &detection), detection))
}

/// Harris corners of the grayscale image plus the contours to count them against.
pub fn find_corners_with_harris(
    image: &DynamicImage,
    config: &DetectorConfig,
) -> Result<(Vec<Keypoint>, Vec<Contour>)> {
    find_corners(image, config, &HarrisDetector::from(&config.harris))
}

/// Shi-Tomasi features of the grayscale image plus the contours to count them against.
pub fn find_corners_with_shi_tomasi(
    image: &DynamicImage,
    config: &DetectorConfig,
) -> Result<(Vec<Keypoint>, Vec<Contour>)> {
    find_corners(image, config, &ShiTomasiDetector::from(&config.shi_tomasi))
}

fn find_corners(
    image: &DynamicImage,
    config: &DetectorConfig,
    detector: &dyn CornerDetector,
) -> Result<(Vec<Keypoint>, Vec<Contour>)> {
    let gray = image.to_luma8();
    let contours = PipelineBuilder::build_for_corners(config).find_contours(&gray)?;
    let corners = detector.detect_corners(&gray)?;
    Ok((corners, contours))
}

/// Corner-count classification of `contours`, drawing the enclosed corners
/// onto a copy of `image`.
pub fn detect_and_draw_diagonals(
    image: &DynamicImage,
    corners: &[Keypoint],
    contours: &[Contour],
) -> Result<(RgbImage, Detection)> {
    let rgb = image.to_rgb8();
    let detection = label_contours_by_corners(contours, corners, rgb.width(), rgb.height())?;
    Ok((annotate(&rgb, &detection), detection))
}
