use crate::error::{Result, TriangulationError};
use crate::math::polygon_2d::{cross_2d, point_in_triangle};
use crate::math::Point2;

/// Hard safety stop for the clipping loop. Reached only on pathological
/// input; the remaining polygon is fanned so the kernel always
/// terminates.
const MAX_CLIP_ITERATIONS: usize = 10_000;

/// Result of triangulating a simple polygon.
#[derive(Debug, Clone)]
pub struct Triangulation {
    /// Triangles as index triples into the input polygon.
    pub triangles: Vec<[u32; 3]>,
    /// Number of times the ear scan stalled and the fan fallback fired.
    /// Zero on well-conditioned input; useful as a mesh-quality
    /// diagnostic.
    pub fan_fallbacks: usize,
}

/// Ear-clipping triangulation of a simple counter-clockwise polygon.
///
/// A vertex is an ear when its corner is convex and no other remaining
/// vertex lies inside the candidate triangle. The first valid ear found
/// per scan is clipped. If a full scan finds no ear (numerically
/// degenerate or near-collinear input) the remaining polygon is fan
/// triangulated from its first vertex, trading mesh quality for
/// guaranteed termination.
#[derive(Debug)]
pub struct Triangulate {
    polygon: Vec<Point2>,
}

impl Triangulate {
    /// Creates a new triangulation operation.
    #[must_use]
    pub fn new(polygon: Vec<Point2>) -> Self {
        Self { polygon }
    }

    /// Executes the triangulation, producing exactly `n - 2` triangles.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::InvalidPolygon`] if the polygon has
    /// fewer than 3 vertices.
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(&self) -> Result<Triangulation> {
        let n = self.polygon.len();
        if n < 3 {
            return Err(TriangulationError::InvalidPolygon(n).into());
        }

        let mut remaining: Vec<usize> = (0..n).collect();
        let mut triangles: Vec<[u32; 3]> = Vec::with_capacity(n - 2);
        let mut fan_fallbacks = 0;
        let mut iterations = 0;

        while remaining.len() > 3 {
            iterations += 1;
            match self.find_ear(&remaining) {
                Some(vi) => {
                    let m = remaining.len();
                    let i0 = remaining[(vi + m - 1) % m];
                    let i1 = remaining[vi];
                    let i2 = remaining[(vi + 1) % m];
                    triangles.push([i0 as u32, i1 as u32, i2 as u32]);
                    remaining.remove(vi);
                }
                None => {
                    emit_fan(&remaining, &mut triangles);
                    fan_fallbacks += 1;
                    return Ok(Triangulation {
                        triangles,
                        fan_fallbacks,
                    });
                }
            }
            if iterations >= MAX_CLIP_ITERATIONS {
                emit_fan(&remaining, &mut triangles);
                fan_fallbacks += 1;
                return Ok(Triangulation {
                    triangles,
                    fan_fallbacks,
                });
            }
        }

        triangles.push([
            remaining[0] as u32,
            remaining[1] as u32,
            remaining[2] as u32,
        ]);
        Ok(Triangulation {
            triangles,
            fan_fallbacks,
        })
    }

    /// Scans the remaining vertices for the first valid ear.
    fn find_ear(&self, remaining: &[usize]) -> Option<usize> {
        let m = remaining.len();
        for vi in 0..m {
            let prev = (vi + m - 1) % m;
            let next = (vi + 1) % m;
            let a = self.polygon[remaining[prev]];
            let b = self.polygon[remaining[vi]];
            let c = self.polygon[remaining[next]];

            // Convex corner for a CCW polygon.
            if cross_2d(&(b - a), &(c - b)) <= 0.0 {
                continue;
            }

            // No other remaining vertex may lie inside the candidate.
            let blocked = (0..m).any(|j| {
                j != prev
                    && j != vi
                    && j != next
                    && point_in_triangle(&self.polygon[remaining[j]], &a, &b, &c)
            });
            if !blocked {
                return Some(vi);
            }
        }
        None
    }
}

/// Fan triangulation of the remaining polygon from its first vertex.
#[allow(clippy::cast_possible_truncation)]
fn emit_fan(remaining: &[usize], triangles: &mut Vec<[u32; 3]>) {
    for k in 1..remaining.len() - 1 {
        triangles.push([
            remaining[0] as u32,
            remaining[k] as u32,
            remaining[k + 1] as u32,
        ]);
    }
}
