use super::{Point2, Vector2, TOLERANCE};

/// Cumulative arc-length table for a polyline.
///
/// Returns one entry per vertex (starting at 0.0) plus the total length.
#[must_use]
pub fn cumulative_lengths(path: &[Point2]) -> (Vec<f64>, f64) {
    let mut cum = Vec::with_capacity(path.len());
    cum.push(0.0);
    let mut total = 0.0;
    for pair in path.windows(2) {
        total += (pair[1] - pair[0]).norm();
        cum.push(total);
    }
    (cum, total)
}

/// Samples a polyline at fractional arc length `s` in [0, 1].
///
/// Returns the interpolated position and the unit tangent of the
/// containing segment. Out-of-range fractions are clamped; a degenerate
/// segment yields a +X tangent.
#[must_use]
pub fn sample_at_fraction(path: &[Point2], s: f64) -> (Point2, Vector2) {
    let (cum, total) = cumulative_lengths(path);
    if total < TOLERANCE || path.len() < 2 {
        return (path[0], Vector2::new(1.0, 0.0));
    }
    let s_abs = s.clamp(0.0, 1.0) * total;

    // Locate the containing segment: last entry not past s_abs.
    let i = cum
        .partition_point(|&c| c <= s_abs)
        .saturating_sub(1)
        .min(path.len() - 2);

    let seg = path[i + 1] - path[i];
    let len = seg.norm();
    if len < TOLERANCE {
        return (path[i], Vector2::new(1.0, 0.0));
    }
    let tangent = seg / len;
    let u = (s_abs - cum[i]) / len;
    let pos = path[i] + seg * u;
    (pos, tangent)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn lengths_accumulate() {
        let (cum, total) = cumulative_lengths(&[p(0.0, 0.0), p(3.0, 0.0), p(3.0, 4.0)]);
        assert_eq!(cum.len(), 3);
        assert!((cum[1] - 3.0).abs() < TOLERANCE);
        assert!((cum[2] - 7.0).abs() < TOLERANCE);
        assert!((total - 7.0).abs() < TOLERANCE);
    }

    #[test]
    fn midpoint_of_straight_path() {
        let (pos, tangent) = sample_at_fraction(&[p(0.0, 0.0), p(4.0, 0.0)], 0.5);
        assert!((pos.x - 2.0).abs() < TOLERANCE);
        assert!((pos.y).abs() < TOLERANCE);
        assert!((tangent.x - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn sample_crosses_into_second_segment() {
        // Total length 8; s=0.75 lands 2 units into the vertical segment.
        let path = [p(0.0, 0.0), p(4.0, 0.0), p(4.0, 4.0)];
        let (pos, tangent) = sample_at_fraction(&path, 0.75);
        assert!((pos.x - 4.0).abs() < TOLERANCE);
        assert!((pos.y - 2.0).abs() < TOLERANCE);
        assert!((tangent.y - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn out_of_range_fractions_clamp_to_endpoints() {
        let path = [p(1.0, 1.0), p(5.0, 1.0)];
        let (start, _) = sample_at_fraction(&path, -2.0);
        let (end, _) = sample_at_fraction(&path, 7.0);
        assert!((start.x - 1.0).abs() < TOLERANCE);
        assert!((end.x - 5.0).abs() < TOLERANCE);
    }

    #[test]
    fn zero_length_path_falls_back() {
        let (pos, tangent) = sample_at_fraction(&[p(2.0, 3.0), p(2.0, 3.0)], 0.5);
        assert!((pos.x - 2.0).abs() < TOLERANCE);
        assert!((pos.y - 3.0).abs() < TOLERANCE);
        assert!((tangent.x - 1.0).abs() < TOLERANCE);
    }
}
