//! Drawing of detection results onto a copy of the source image.
//!
//! Labels themselves are not rendered; they travel in the [`Detection`] and its
//! GeoJSON export.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_filled_circle_mut, draw_line_segment_mut};

use crate::types::{DetectedShape, Detection, Point};

const OUTLINE_COLOR: Rgb<u8> = Rgb([0, 200, 0]);
const VERTEX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const CORNER_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const CENTROID_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

const VERTEX_RADIUS: i32 = 5;
const CORNER_RADIUS: i32 = 10;

/// Returns `image` with every shape's outline, vertices, enclosed corners and
/// centroid drawn on top. The input is left untouched.
pub fn annotate(image: &RgbImage, detection: &Detection) -> RgbImage {
    let mut canvas = image.clone();
    for shape in &detection.shapes {
        draw_shape(&mut canvas, shape);
    }
    canvas
}

fn draw_shape(canvas: &mut RgbImage, shape: &DetectedShape) {
    draw_closed_outline(canvas, &shape.outline);

    for vertex in &shape.vertices {
        draw_filled_circle_mut(canvas, pixel(*vertex), VERTEX_RADIUS, VERTEX_COLOR);
    }
    for corner in &shape.corners {
        draw_filled_circle_mut(canvas, pixel(*corner), CORNER_RADIUS, CORNER_COLOR);
    }

    let (cx, cy) = pixel(shape.centroid);
    draw_cross_mut(canvas, CENTROID_COLOR, cx, cy);
}

fn draw_closed_outline(canvas: &mut RgbImage, outline: &[Point]) {
    if outline.len() < 2 {
        return;
    }
    for (i, &start) in outline.iter().enumerate() {
        let end = outline[(i + 1) % outline.len()];
        draw_line_segment_mut(
            canvas,
            (start.x as f32, start.y as f32),
            (end.x as f32, end.y as f32),
            OUTLINE_COLOR,
        );
    }
}

fn pixel(p: Point) -> (i32, i32) {
    (p.x.round() as i32, p.y.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{algorithms::ClassificationStrategy, types::ShapeLabel};

    fn detection() -> Detection {
        let outline = vec![
            Point::new(20.0, 20.0),
            Point::new(80.0, 20.0),
            Point::new(80.0, 80.0),
            Point::new(20.0, 80.0),
        ];
        Detection {
            strategy: ClassificationStrategy::VertexCount,
            shapes: vec![DetectedShape {
                vertices: outline.clone(),
                outline,
                corners: vec![],
                count: 4,
                label: ShapeLabel::Quadrilateral,
                centroid: Point::new(50.0, 50.0),
            }],
            image_width: 100,
            image_height: 100,
        }
    }

    #[test]
    fn test_annotate_draws_on_a_copy() {
        let source = RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]));
        let annotated = annotate(&source, &detection());

        assert_eq!(annotated.dimensions(), source.dimensions());
        assert!(source.pixels().all(|p| *p == Rgb([255, 255, 255])));

        assert_eq!(*annotated.get_pixel(20, 20), VERTEX_COLOR);
        assert_eq!(*annotated.get_pixel(50, 20), OUTLINE_COLOR);
        assert_eq!(*annotated.get_pixel(50, 50), CENTROID_COLOR);
        assert_eq!(*annotated.get_pixel(35, 50), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_corners_are_drawn() {
        let mut detection = detection();
        detection.shapes[0].vertices.clear();
        detection.shapes[0].corners = vec![Point::new(30.0, 30.0)];

        let source = RgbImage::new(100, 100);
        let annotated = annotate(&source, &detection);
        assert_eq!(*annotated.get_pixel(30, 30), CORNER_COLOR);
        assert_eq!(*annotated.get_pixel(38, 30), CORNER_COLOR);
    }

    #[test]
    fn test_shapes_near_the_border_are_clipped() {
        let mut detection = detection();
        detection.shapes[0].vertices = vec![Point::new(0.0, 0.0), Point::new(99.0, 99.0)];
        detection.shapes[0].centroid = Point::new(-5.0, 120.0);

        let annotated = annotate(&RgbImage::new(100, 100), &detection);
        assert_eq!(*annotated.get_pixel(0, 0), VERTEX_COLOR);
    }
}
