use crate::error::{Result, SceneError};
use crate::math::intersect_2d::{line_line_intersect_2d, normalize_or_zero, rotate_ccw};
use crate::math::{Point2, Vector2, TOLERANCE};

/// The two parallel chains produced by offsetting a polyline.
///
/// Both chains have the same vertex count as the input path; `left` lies
/// on the counter-clockwise side of the walking direction.
#[derive(Debug, Clone)]
pub struct OffsetChains {
    /// Chain at `+offset` along the left normals.
    pub left: Vec<Point2>,
    /// Chain at `-offset` along the left normals.
    pub right: Vec<Point2>,
}

/// Offsets an open polyline to both sides at a fixed perpendicular
/// distance.
///
/// Interior vertices use a true miter join (intersection of the two
/// adjacent offset lines) so the perpendicular distance is preserved at
/// bends; when that intersection is undefined (parallel or near-parallel
/// segments) the join falls back to the midpoint of the two naive
/// offsets. Endpoints use a plain perpendicular offset.
#[derive(Debug)]
pub struct OffsetPolyline {
    path: Vec<Point2>,
    offset: f64,
}

impl OffsetPolyline {
    /// Creates a new polyline offset operation.
    #[must_use]
    pub fn new(path: Vec<Point2>, offset: f64) -> Self {
        Self { path, offset }
    }

    /// Executes the offset.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::CenterlineTooShort`] if the path has fewer
    /// than 2 points.
    pub fn execute(&self) -> Result<OffsetChains> {
        let n = self.path.len();
        if n < 2 {
            return Err(SceneError::CenterlineTooShort(n).into());
        }

        // Per-segment unit tangents; a degenerate segment falls back to
        // the +X direction.
        let mut tangents: Vec<Vector2> = Vec::with_capacity(n - 1);
        for pair in self.path.windows(2) {
            let t = normalize_or_zero(pair[1] - pair[0]);
            tangents.push(if t.norm() < TOLERANCE {
                Vector2::new(1.0, 0.0)
            } else {
                t
            });
        }
        let normals: Vec<Vector2> = tangents.iter().map(|&t| rotate_ccw(t)).collect();

        let mut left = Vec::with_capacity(n);
        let mut right = Vec::with_capacity(n);
        left.push(self.path[0] + self.offset * normals[0]);
        right.push(self.path[0] - self.offset * normals[0]);

        for k in 1..n - 1 {
            let corner = self.path[k];
            left.push(miter_join(
                &corner,
                &tangents[k - 1],
                &normals[k - 1],
                &tangents[k],
                &normals[k],
                self.offset,
            ));
            right.push(miter_join(
                &corner,
                &tangents[k - 1],
                &normals[k - 1],
                &tangents[k],
                &normals[k],
                -self.offset,
            ));
        }

        left.push(self.path[n - 1] + self.offset * normals[n - 2]);
        right.push(self.path[n - 1] - self.offset * normals[n - 2]);

        Ok(OffsetChains { left, right })
    }
}

/// Intersects the two offset lines meeting at `corner`.
///
/// Falls back to the midpoint of the two naive offset points when the
/// lines are (near-)parallel, which keeps collinear and hairpin joints
/// finite.
fn miter_join(
    corner: &Point2,
    tangent_prev: &Vector2,
    normal_prev: &Vector2,
    tangent_next: &Vector2,
    normal_next: &Vector2,
    offset: f64,
) -> Point2 {
    let from_prev = corner + offset * normal_prev;
    let from_next = corner + offset * normal_next;
    match line_line_intersect_2d(&from_prev, tangent_prev, &from_next, tangent_next) {
        Some(pt) => pt,
        None => Point2::from((from_prev.coords + from_next.coords) * 0.5),
    }
}
