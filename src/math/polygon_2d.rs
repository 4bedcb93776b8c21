use super::{Point2, Vector2};

/// Denominator threshold below which the barycentric solve is considered
/// degenerate (collinear triangle).
const BARYCENTRIC_DEGENERATE: f64 = 1e-15;

/// Inclusive tolerance for barycentric containment tests.
const BARYCENTRIC_EPS: f64 = 1e-12;

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Normalizes a closed polygon to counter-clockwise winding.
#[must_use]
pub fn ensure_ccw(points: Vec<Point2>) -> Vec<Point2> {
    if signed_area_2d(&points) > 0.0 {
        points
    } else {
        points.into_iter().rev().collect()
    }
}

/// 2D cross product (z component of the 3D cross).
#[must_use]
pub fn cross_2d(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Barycentric point-in-triangle test with a small inclusive tolerance.
///
/// A degenerate (collinear) triangle contains nothing.
#[must_use]
pub fn point_in_triangle(p: &Point2, a: &Point2, b: &Point2, c: &Point2) -> bool {
    let v0 = c - a;
    let v1 = b - a;
    let v2 = p - a;
    let den = v0.x * v1.y - v1.x * v0.y;
    if den.abs() < BARYCENTRIC_DEGENERATE {
        return false;
    }
    let u = (v2.x * v1.y - v1.x * v2.y) / den;
    let v = (v0.x * v2.y - v2.x * v0.y) / den;
    u >= -BARYCENTRIC_EPS && v >= -BARYCENTRIC_EPS && u + v <= 1.0 + BARYCENTRIC_EPS
}
