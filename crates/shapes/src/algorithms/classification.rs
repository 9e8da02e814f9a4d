//! Count-to-label lookup and centroid estimation.
//!
//! Two strategies share one table layout but differ at the edges: vertex
//! counting has no label below three vertices and calls anything above eight
//! a circle, corner counting calls an outline without corners a circle and
//! gives up above eight.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
    error::{Result, ShapeError},
    types::{Contour, Keypoint, Point, ShapeLabel, ShapeLabel::*},
};

/// Bumped whenever an entry of either table changes.
pub const LABEL_TABLE_VERSION: u32 = 1;

/// Label lookup for counts `0..=8` plus a label for every larger count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    pub version: u32,
    pub entries: [ShapeLabel; 9],
    pub overflow: ShapeLabel,
}

impl LabelTable {
    pub fn lookup(&self, count: usize) -> ShapeLabel {
        self.entries.get(count).copied().unwrap_or(self.overflow)
    }
}

/// Vertices of a simplified polygon.
pub static VERTEX_COUNT_TABLE: LabelTable = LabelTable {
    version: LABEL_TABLE_VERSION,
    entries: [
        Unknown, Unknown, Unknown,
        Triangle, Quadrilateral, Pentagon, Hexagon, Heptagon, Octagon,
    ],
    overflow: Circle,
};

/// Corner keypoints inside an outline.
pub static CORNER_COUNT_TABLE: LabelTable = LabelTable {
    version: LABEL_TABLE_VERSION,
    entries: [
        Circle, Dot, Dot,
        Triangle, Quadrilateral, Pentagon, Hexagon, Heptagon, Octagon,
    ],
    overflow: Unknown,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClassificationStrategy {
    /// Count the vertices left after simplifying the convex hull
    VertexCount,
    /// Count detected corner keypoints that fall inside the contour
    CornerCount,
}

impl ClassificationStrategy {
    pub fn table(&self) -> &'static LabelTable {
        match self {
            Self::VertexCount => &VERTEX_COUNT_TABLE,
            Self::CornerCount => &CORNER_COUNT_TABLE,
        }
    }

    pub fn classify(&self, count: usize) -> ShapeLabel {
        self.table().lookup(count)
    }
}

pub fn classify_by_vertex_count(polygon: &[Point]) -> ShapeLabel {
    ClassificationStrategy::VertexCount.classify(polygon.len())
}

/// Corners lying inside `contour` or on its boundary, in input order.
pub fn corners_inside(contour: &Contour, corners: &[Keypoint]) -> Result<Vec<Point>> {
    if contour.is_empty() {
        return Err(ShapeError::InvalidInput(
            "cannot test corners against an empty contour".to_string(),
        ));
    }

    Ok(corners
        .iter()
        .map(|kp| kp.point)
        .filter(|&p| contour.encloses(p))
        .collect())
}

pub fn classify_by_corner_count(contour: &Contour, corners: &[Keypoint]) -> Result<ShapeLabel> {
    let inside = corners_inside(contour, corners)?;
    Ok(ClassificationStrategy::CornerCount.classify(inside.len()))
}

/// Raw spatial moments of a closed polygon, via Green's theorem.
///
/// Signs follow the ring orientation; the centroid is orientation independent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    pub fn of(points: &[Point]) -> Self {
        let mut moments = Moments::default();
        let n = points.len();
        if n < 3 {
            return moments;
        }

        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            let cross = a.x * b.y - b.x * a.y;
            moments.m00 += cross;
            moments.m10 += (a.x + b.x) * cross;
            moments.m01 += (a.y + b.y) * cross;
        }

        moments.m00 /= 2.0;
        moments.m10 /= 6.0;
        moments.m01 /= 6.0;
        moments
    }

    /// `(m10 / m00, m01 / m00)`, or the origin for a zero-area polygon.
    pub fn centroid(&self) -> Point {
        if self.m00 == 0.0 {
            return Point::default();
        }
        Point::new(self.m10 / self.m00, self.m01 / self.m00)
    }
}

pub fn centroid(points: &[Point]) -> Point {
    Moments::of(points).centroid()
}
