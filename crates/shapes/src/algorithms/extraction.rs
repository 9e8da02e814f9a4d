use image::GrayImage;
use imageproc::contours::BorderType;
use tracing::debug;

use crate::{
    config::ExtractionConfig,
    error::Result,
    traits::ContourExtractor,
    types::{Contour, ConvexHull, Point},
};

/// Imageproc-based extractor returning only outermost contours, chain
/// compressed and filtered by enclosed area.
#[derive(Debug, Clone)]
pub struct ImageprocContourExtractor {
    pub min_area: f64,
}

impl Default for ImageprocContourExtractor {
    fn default() -> Self {
        Self::from(&ExtractionConfig::default())
    }
}

impl From<&ExtractionConfig> for ImageprocContourExtractor {
    fn from(config: &ExtractionConfig) -> Self {
        Self { min_area: config.min_area }
    }
}

impl ContourExtractor for ImageprocContourExtractor {
    fn extract_contours(&self, mask: &GrayImage) -> Result<Vec<Contour>> {
        let traced = imageproc::contours::find_contours::<i32>(mask);
        let traced_count = traced.len();

        let external: Vec<Contour> = traced
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .map(|c| {
                let points: Vec<Point> = c.points.into_iter().map(Point::from).collect();
                Contour::new(compress_chain(&points))
            })
            .collect();
        let external_count = external.len();

        let contours: Vec<Contour> = external
            .into_iter()
            .filter(|c| c.area() > self.min_area)
            .collect();

        debug!(
            traced = traced_count,
            external = external_count,
            kept = contours.len(),
            min_area = self.min_area,
            "extracted contours"
        );

        Ok(contours)
    }
}

/// Drops points in the middle of straight runs of a closed boundary, keeping
/// only the points where the step direction changes.
pub fn compress_chain(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let step = |from: Point, to: Point| (to.x - from.x, to.y - from.y);
    let compressed: Vec<Point> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect();

    if compressed.len() < 2 {
        return points.to_vec();
    }
    compressed
}

/// Convex hull of every contour, in the same order.
pub fn convex_hulls(contours: &[Contour]) -> Vec<ConvexHull> {
    contours.iter().map(Contour::convex_hull).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::signed_area;
    use image::Luma;

    fn fill(img: &mut GrayImage, from: u32, to: u32, value: u8) {
        for y in from..to {
            for x in from..to {
                img.put_pixel(x, y, Luma([value]));
            }
        }
    }

    #[test]
    fn test_empty_mask_has_no_contours() {
        let mask = GrayImage::new(50, 50);
        let contours = ImageprocContourExtractor::default().extract_contours(&mask).unwrap();
        assert!(contours.is_empty());
    }

    #[test]
    fn test_square_compresses_to_corners() {
        let mut mask = GrayImage::new(100, 100);
        fill(&mut mask, 20, 60, 255);

        let contours = ImageprocContourExtractor::default().extract_contours(&mask).unwrap();
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 4);
        assert!((contours[0].area() - 39.0 * 39.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_contours_are_dropped() {
        let mut mask = GrayImage::new(100, 100);
        fill(&mut mask, 20, 60, 255);
        fill(&mut mask, 80, 85, 255);

        let contours = ImageprocContourExtractor::default().extract_contours(&mask).unwrap();
        assert_eq!(contours.len(), 1);

        let everything = ImageprocContourExtractor { min_area: 0.0 };
        assert_eq!(everything.extract_contours(&mask).unwrap().len(), 2);
    }

    #[test]
    fn test_only_external_contours() {
        let mut mask = GrayImage::new(100, 100);
        fill(&mut mask, 10, 90, 255);
        fill(&mut mask, 30, 70, 0);
        fill(&mut mask, 45, 55, 255);

        let extractor = ImageprocContourExtractor { min_area: 0.0 };
        let contours = extractor.extract_contours(&mask).unwrap();
        assert_eq!(contours.len(), 1);
        assert!(contours[0].area() > 70.0 * 70.0);
    }

    #[test]
    fn test_compress_chain_keeps_turns() {
        let points: Vec<Point> = [(0, 0), (1, 0), (2, 0), (2, 1), (2, 2), (1, 2), (0, 2), (0, 1)]
            .iter()
            .map(|&(x, y)| Point::new(x as f64, y as f64))
            .collect();
        assert_eq!(
            compress_chain(&points),
            vec![
                Point::new(0.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(2.0, 2.0),
                Point::new(0.0, 2.0),
            ]
        );
    }

    #[test]
    fn test_hulls_follow_contour_order() {
        let contours = vec![
            Contour::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0)]),
            Contour::new(vec![
                Point::new(50.0, 50.0),
                Point::new(60.0, 50.0),
                Point::new(60.0, 60.0),
                Point::new(50.0, 60.0),
            ]),
        ];
        let hulls = convex_hulls(&contours);
        assert_eq!(hulls.len(), 2);
        assert_eq!(hulls[0].len(), 3);
        assert_eq!(hulls[1].len(), 4);
    }

    #[test]
    fn test_hull_winds_like_traced_contour() {
        let mut mask = GrayImage::new(100, 100);
        let triangle = [
            imageproc::point::Point::new(50, 10),
            imageproc::point::Point::new(90, 80),
            imageproc::point::Point::new(10, 80),
        ];
        imageproc::drawing::draw_polygon_mut(&mut mask, &triangle, Luma([255u8]));

        let contours = ImageprocContourExtractor::default().extract_contours(&mask).unwrap();
        assert_eq!(contours.len(), 1);

        let hull = contours[0].convex_hull();
        let contour_area = signed_area(&contours[0].points);
        let hull_area = signed_area(&hull.points);
        assert!(contour_area * hull_area > 0.0, "contour {contour_area} vs hull {hull_area}");
    }
}
