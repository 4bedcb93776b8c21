use super::{Point2, Vector2, TOLERANCE};

/// Normalizes a 2D vector, returning the zero vector unchanged if the
/// input has (near-)zero length.
///
/// Callers must treat a zero result as a degenerate direction.
#[must_use]
pub fn normalize_or_zero(v: Vector2) -> Vector2 {
    let n = v.norm();
    if n < TOLERANCE {
        return Vector2::zeros();
    }
    v / n
}

/// Rotates a 2D vector 90 degrees counter-clockwise.
///
/// For a unit tangent this is the left-pointing normal.
#[must_use]
pub fn rotate_ccw(v: Vector2) -> Vector2 {
    Vector2::new(-v.y, v.x)
}

/// Rotates a 2D vector 90 degrees clockwise.
#[must_use]
pub fn rotate_cw(v: Vector2) -> Vector2 {
    Vector2::new(v.y, -v.x)
}

/// Intersection of the lines `p + t * d` and `q + s * e`.
///
/// Returns `None` when the 2x2 determinant is below tolerance
/// (parallel or near-parallel lines); callers fall back to a
/// midpoint join.
#[must_use]
pub fn line_line_intersect_2d(
    p: &Point2,
    d: &Vector2,
    q: &Point2,
    e: &Vector2,
) -> Option<Point2> {
    let det = d.x * e.y - d.y * e.x;
    if det.abs() < TOLERANCE {
        return None;
    }
    let dx = q.x - p.x;
    let dy = q.y - p.y;
    let t = (dx * e.y - dy * e.x) / det;
    Some(Point2::new(p.x + t * d.x, p.y + t * d.y))
}
