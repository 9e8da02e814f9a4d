use geo::{Area, ConvexHull as _, EuclideanLength};
use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo_types::{Coord, LineString, Polygon};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};
use ts_rs::TS;

use crate::algorithms::classification::ClassificationStrategy;

/// A 2D point in image coordinates (x to the right, y down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema, TS)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<Point> for Coord<f64> {
    fn from(p: Point) -> Self {
        Coord { x: p.x, y: p.y }
    }
}

impl From<Coord<f64>> for Point {
    fn from(c: Coord<f64>) -> Self {
        Point::new(c.x, c.y)
    }
}

impl From<imageproc::point::Point<i32>> for Point {
    fn from(p: imageproc::point::Point<i32>) -> Self {
        Point::new(p.x as f64, p.y as f64)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

fn to_line_string(points: &[Point]) -> LineString<f64> {
    LineString::new(points.iter().copied().map(Coord::from).collect())
}

fn to_polygon(points: &[Point]) -> Polygon<f64> {
    Polygon::new(to_line_string(points), vec![])
}

/// Length of the polyline through `points`, including the closing edge when `closed`.
pub fn arc_length(points: &[Point], closed: bool) -> f64 {
    let mut line = to_line_string(points);
    if closed {
        line.close();
    }
    line.euclidean_length()
}

/// Unsigned area enclosed by the ring through `points`.
pub fn enclosed_area(points: &[Point]) -> f64 {
    to_polygon(points).unsigned_area()
}

/// Shoelace area of the ring through `points`; the sign gives its winding.
pub fn signed_area(points: &[Point]) -> f64 {
    to_polygon(points).signed_area()
}

/// Where a point lies relative to a closed outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointPosition {
    Inside,
    OnBoundary,
    Outside,
}

/// A closed outline traced from a binary mask, in traversal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn to_geo_polygon(&self) -> Polygon<f64> {
        to_polygon(&self.points)
    }

    pub fn area(&self) -> f64 {
        enclosed_area(&self.points)
    }

    /// Closed arc length of the outline
    pub fn perimeter(&self) -> f64 {
        arc_length(&self.points, true)
    }

    /// Point-in-polygon test against this outline.
    pub fn position_of(&self, point: Point) -> PointPosition {
        match self.to_geo_polygon().coordinate_position(&Coord::from(point)) {
            CoordPos::Inside => PointPosition::Inside,
            CoordPos::OnBoundary => PointPosition::OnBoundary,
            CoordPos::Outside => PointPosition::Outside,
        }
    }

    /// Inside or on the boundary.
    pub fn encloses(&self, point: Point) -> bool {
        self.position_of(point) != PointPosition::Outside
    }

    pub fn convex_hull(&self) -> ConvexHull {
        let hull = to_line_string(&self.points).convex_hull();
        let mut points: Vec<Point> = hull.exterior().coords().copied().map(Point::from).collect();
        // geo returns a closed ring
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        // geo fixes the hull winding; follow the contour's instead
        if signed_area(&points) * signed_area(&self.points) < 0.0 {
            points.reverse();
        }
        ConvexHull { points }
    }
}

/// Convex boundary of a [`Contour`], open ring (first point not repeated).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvexHull {
    pub points: Vec<Point>,
}

impl ConvexHull {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn perimeter(&self) -> f64 {
        arc_length(&self.points, true)
    }

    pub fn area(&self) -> f64 {
        enclosed_area(&self.points)
    }
}

/// A detected corner feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub point: Point,
    /// Detector response at the keypoint (Harris score or minimum eigenvalue)
    pub response: f32,
}

impl Keypoint {
    pub fn new(x: f64, y: f64, response: f32) -> Self {
        Self { point: Point::new(x, y), response }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    Serialize, Deserialize, JsonSchema, TS,
    Display, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
pub enum ShapeLabel {
    Dot,
    Triangle,
    Quadrilateral,
    Pentagon,
    Hexagon,
    Heptagon,
    Octagon,
    Circle,
    Unknown,
}

/// One classified outline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedShape {
    /// The outline the label refers to: the convex hull for vertex counting,
    /// the traced contour for corner counting
    pub outline: Vec<Point>,
    /// Final vertex set after simplification and merging (vertex counting only)
    pub vertices: Vec<Point>,
    /// Keypoints found inside the outline (corner counting only)
    pub corners: Vec<Point>,
    /// The count the label was looked up with
    pub count: usize,
    pub label: ShapeLabel,
    pub centroid: Point,
}

impl DetectedShape {
    pub fn area(&self) -> f64 {
        enclosed_area(&self.outline)
    }

    pub fn perimeter(&self) -> f64 {
        arc_length(&self.outline, true)
    }
}

/// Result of running one classification strategy over one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub strategy: ClassificationStrategy,
    /// Shapes in contour order
    pub shapes: Vec<DetectedShape>,
    pub image_width: u32,
    pub image_height: u32,
}
