//! Polygon simplification: Ramer-Douglas-Peucker followed by two
//! de-duplication passes that stabilise the vertex count of noisy hulls.

use tracing::debug;

use crate::{
    config::SimplifyConfig,
    error::{Result, ShapeError},
    types::{ConvexHull, Point},
};

/// Distance from `p` to the infinite line through `a` and `b`.
///
/// When `a` and `b` coincide this is the plain distance from `p` to `a`.
pub fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length = dx.hypot(dy);

    if length == 0.0 {
        return p.distance(a);
    }

    (dx * (a.y - p.y) - dy * (a.x - p.x)).abs() / length
}

/// Ramer-Douglas-Peucker simplification of an ordered point sequence.
///
/// The first and last points anchor the sequence and are always kept. Every
/// discarded point lies within `epsilon` of the anchor line of the range it
/// was discarded from. Ranges are processed from an explicit stack so deep
/// splits on long, nearly straight inputs cannot exhaust the call stack.
pub fn simplify(points: &[Point], epsilon: f64) -> Result<Vec<Point>> {
    if points.len() < 2 {
        return Err(ShapeError::InvalidInput(format!(
            "simplify needs at least 2 points, got {}",
            points.len()
        )));
    }
    if !(epsilon >= 0.0) {
        return Err(ShapeError::InvalidInput(format!(
            "epsilon must be a non-negative number, got {epsilon}"
        )));
    }

    let last = points.len() - 1;
    let mut kept = vec![false; points.len()];
    kept[0] = true;
    kept[last] = true;

    let mut ranges = vec![(0usize, last)];
    while let Some((start, end)) = ranges.pop() {
        if end <= start + 1 {
            continue;
        }

        let mut max_dist = 0.0;
        let mut max_idx = start;
        for i in (start + 1)..end {
            let d = perpendicular_distance(points[i], points[start], points[end]);
            // strict comparison: the first index reaching the maximum wins
            if d > max_dist {
                max_dist = d;
                max_idx = i;
            }
        }

        if max_dist > epsilon {
            kept[max_idx] = true;
            ranges.push((max_idx, end));
            ranges.push((start, max_idx));
        }
    }

    Ok(points
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect())
}

/// Sequential filter: keeps the first point, then every point farther than
/// `threshold` from the last point kept.
pub fn filter_close(points: &[Point], threshold: f64) -> Vec<Point> {
    let Some((&first, rest)) = points.split_first() else {
        return Vec::new();
    };

    let mut filtered = vec![first];
    for &point in rest {
        if let Some(&last) = filtered.last() {
            if point.distance(last) > threshold {
                filtered.push(point);
            }
        }
    }
    filtered
}

/// Greedy merge: keeps the first point, then every point farther than
/// `threshold` from all points kept so far. Quadratic in the number of points.
pub fn merge_close(points: &[Point], threshold: f64) -> Vec<Point> {
    let Some((&first, rest)) = points.split_first() else {
        return Vec::new();
    };

    let mut merged = vec![first];
    for &point in rest {
        if merged.iter().all(|kept| point.distance(*kept) > threshold) {
            merged.push(point);
        }
    }
    merged
}

/// Reduces a convex hull to its classification vertex set.
#[derive(Debug, Clone)]
pub struct PolygonSimplifier {
    /// Epsilon as a fraction of the hull perimeter
    pub epsilon_ratio: f64,
    /// `filter_close` threshold is `perimeter / filter_divisor`
    pub filter_divisor: f64,
    /// Absolute `merge_close` threshold in pixels
    pub merge_distance: f64,
}

impl Default for PolygonSimplifier {
    fn default() -> Self {
        Self::from(&SimplifyConfig::default())
    }
}

impl From<&SimplifyConfig> for PolygonSimplifier {
    fn from(config: &SimplifyConfig) -> Self {
        Self {
            epsilon_ratio: config.epsilon_ratio,
            filter_divisor: config.filter_divisor,
            merge_distance: config.merge_distance,
        }
    }
}

impl PolygonSimplifier {
    pub fn epsilon_for(&self, perimeter: f64) -> f64 {
        self.epsilon_ratio * perimeter
    }

    /// Simplify, filter and merge the hull's points.
    pub fn reduce(&self, hull: &ConvexHull) -> Result<Vec<Point>> {
        let perimeter = hull.perimeter();
        let simplified = simplify(&hull.points, self.epsilon_for(perimeter))?;
        let filtered = filter_close(&simplified, perimeter / self.filter_divisor);
        let merged = merge_close(&filtered, self.merge_distance);

        debug!(
            hull = hull.len(),
            simplified = simplified.len(),
            filtered = filtered.len(),
            merged = merged.len(),
            "reduced hull"
        );

        Ok(merged)
    }
}
