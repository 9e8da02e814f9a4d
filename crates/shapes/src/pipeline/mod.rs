pub mod builder;

use image::GrayImage;
use tracing::{debug, info, warn};

use crate::{
    algorithms::{
        classification::{centroid, classify_by_vertex_count, corners_inside, ClassificationStrategy},
        simplification::PolygonSimplifier,
    },
    error::{Result, ShapeError},
    traits::{ContourExtractor, ImagePreprocessor},
    types::{Contour, DetectedShape, Detection, Keypoint},
};

/// Mask preparation, contour extraction and polygon reduction for one image.
pub struct Pipeline {
    preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    contour_extractor: Box<dyn ContourExtractor>,
    simplifier: PolygonSimplifier,
}

impl Pipeline {
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    pub fn new(
        preprocessors: Vec<Box<dyn ImagePreprocessor>>,
        contour_extractor: Box<dyn ContourExtractor>,
        simplifier: PolygonSimplifier,
    ) -> Self {
        Self {
            preprocessors,
            contour_extractor,
            simplifier,
        }
    }

    /// Run every preprocessor in order, producing the binary mask.
    pub fn mask(&self, image: &GrayImage) -> Result<GrayImage> {
        let mut mask = image.clone();
        for preprocessor in &self.preprocessors {
            let next = preprocessor.preprocess(&mask)?;
            if next.dimensions() != mask.dimensions() {
                return Err(ShapeError::ImageProcessing(format!(
                    "preprocessing changed the image size from {:?} to {:?}",
                    mask.dimensions(),
                    next.dimensions()
                )));
            }
            mask = next;
        }
        Ok(mask)
    }

    /// Outer contours of the mask that survive the area filter.
    pub fn find_contours(&self, image: &GrayImage) -> Result<Vec<Contour>> {
        let mask = self.mask(image)?;
        self.contour_extractor.extract_contours(&mask)
    }

    /// Label every contour by the vertex count of its reduced convex hull.
    pub fn classify_polygons(&self, image: &GrayImage) -> Result<Detection> {
        let contours = self.find_contours(image)?;

        let mut shapes = Vec::with_capacity(contours.len());
        for contour in &contours {
            let hull = contour.convex_hull();
            if hull.len() < 2 {
                warn!(points = contour.len(), "skipping contour with a degenerate hull");
                continue;
            }

            let vertices = self.simplifier.reduce(&hull)?;
            let label = classify_by_vertex_count(&vertices);
            debug!(hull = hull.len(), vertices = vertices.len(), %label, "classified polygon");

            shapes.push(DetectedShape {
                count: vertices.len(),
                centroid: centroid(&vertices),
                outline: hull.points,
                vertices,
                corners: Vec::new(),
                label,
            });
        }

        info!(contours = contours.len(), shapes = shapes.len(), "vertex count classification");

        Ok(Detection {
            strategy: ClassificationStrategy::VertexCount,
            shapes,
            image_width: image.width(),
            image_height: image.height(),
        })
    }

    /// Label every contour of `image` by the number of `corners` it encloses.
    pub fn classify_corners(&self, image: &GrayImage, corners: &[Keypoint]) -> Result<Detection> {
        let contours = self.find_contours(image)?;
        label_contours_by_corners(&contours, corners, image.width(), image.height())
    }

    pub fn info(&self) -> String {
        format!(
            "Pipeline: {} preprocessors, 1 contour extractor, simplifier (epsilon {} x perimeter, filter perimeter / {}, merge {}px)",
            self.preprocessors.len(),
            self.simplifier.epsilon_ratio,
            self.simplifier.filter_divisor,
            self.simplifier.merge_distance,
        )
    }
}

/// Corner-count classification of already extracted contours. Contours with
/// fewer than three points enclose nothing and are skipped.
pub fn label_contours_by_corners(
    contours: &[Contour],
    corners: &[Keypoint],
    image_width: u32,
    image_height: u32,
) -> Result<Detection> {
    let mut shapes = Vec::with_capacity(contours.len());
    for contour in contours {
        if contour.len() < 3 {
            warn!(points = contour.len(), "skipping degenerate contour");
            continue;
        }

        let inside = corners_inside(contour, corners)?;
        let label = ClassificationStrategy::CornerCount.classify(inside.len());
        debug!(inside = inside.len(), %label, "classified contour");

        shapes.push(DetectedShape {
            outline: contour.points.clone(),
            vertices: Vec::new(),
            count: inside.len(),
            corners: inside,
            label,
            centroid: centroid(&contour.points),
        });
    }

    info!(
        contours = contours.len(),
        corners = corners.len(),
        shapes = shapes.len(),
        "corner count classification"
    );

    Ok(Detection {
        strategy: ClassificationStrategy::CornerCount,
        shapes,
        image_width,
        image_height,
    })
}
