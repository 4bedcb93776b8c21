use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::mesh::TriangleMesh;

/// Corner selector: low/high along each of the three frame axes.
/// Index encoding matches `ix * 4 + iy * 2 + iz`.
const QUADS: [[(usize, usize, usize); 4]; 6] = [
    [(1, 0, 0), (1, 1, 0), (1, 1, 1), (1, 0, 1)], // +u
    [(0, 0, 0), (0, 0, 1), (0, 1, 1), (0, 1, 0)], // -u
    [(0, 1, 0), (0, 1, 1), (1, 1, 1), (1, 1, 0)], // +v
    [(0, 0, 0), (1, 0, 0), (1, 0, 1), (0, 0, 1)], // -v
    [(0, 0, 1), (1, 0, 1), (1, 1, 1), (0, 1, 1)], // +w
    [(0, 0, 0), (0, 1, 0), (1, 1, 0), (1, 0, 0)], // -w
];

/// Creates an axis-frame-aligned box mesh from a center, an explicit
/// 3-axis frame, and full extents along each frame axis.
///
/// The 8 corners are computed from half-extents; each of the 6 quads is
/// split into 2 triangles with outward winding.
pub struct MakeCuboid {
    center: Point3,
    frame: [Vector3; 3],
    dims: (f64, f64, f64),
}

impl MakeCuboid {
    /// Creates a new `MakeCuboid` operation.
    #[must_use]
    pub fn new(center: Point3, frame: [Vector3; 3], dims: (f64, f64, f64)) -> Self {
        Self {
            center,
            frame,
            dims,
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if any extent is not positive or a
    /// frame axis is zero-length.
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(&self) -> Result<TriangleMesh> {
        let (a, b, h) = self.dims;
        if a < TOLERANCE || b < TOLERANCE || h < TOLERANCE {
            return Err(GeometryError::Degenerate("cuboid extents must be positive".into()).into());
        }
        for axis in &self.frame {
            if axis.norm() < TOLERANCE {
                return Err(GeometryError::ZeroVector.into());
            }
        }
        let [u, v, w] = self.frame;

        let mut vertices = Vec::with_capacity(8);
        for ix in 0..2 {
            for iy in 0..2 {
                for iz in 0..2 {
                    let sx = if ix == 0 { -0.5 } else { 0.5 };
                    let sy = if iy == 0 { -0.5 } else { 0.5 };
                    let sz = if iz == 0 { -0.5 } else { 0.5 };
                    vertices.push(self.center + u * (sx * a) + v * (sy * b) + w * (sz * h));
                }
            }
        }

        let vid = |(ix, iy, iz): (usize, usize, usize)| (ix * 4 + iy * 2 + iz) as u32;
        let mut indices = Vec::with_capacity(12);
        for quad in &QUADS {
            let q: Vec<u32> = quad.iter().map(|&c| vid(c)).collect();
            indices.push([q[0], q[1], q[2]]);
            indices.push([q[0], q[2], q[3]]);
        }

        Ok(TriangleMesh::new(vertices, indices))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::metrics::{signed_volume, surface_area};

    fn world_frame() -> [Vector3; 3] {
        [Vector3::x(), Vector3::y(), Vector3::z()]
    }

    #[test]
    fn counts() {
        let mesh = MakeCuboid::new(Point3::new(0.0, 0.0, 0.0), world_frame(), (1.0, 1.0, 1.0))
            .execute()
            .unwrap();
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.indices.len(), 12);
        assert!(mesh.indices_in_bounds());
    }

    #[test]
    fn closed_volume_matches_extents() {
        // All-outward winding makes the signed volume exactly a * b * h.
        let mesh = MakeCuboid::new(Point3::new(1.0, -2.0, 3.0), world_frame(), (2.0, 3.0, 4.0))
            .execute()
            .unwrap();
        assert!((signed_volume(&mesh) - 24.0).abs() < 1e-9);
    }

    #[test]
    fn surface_area_matches_extents() {
        let mesh = MakeCuboid::new(Point3::new(0.0, 0.0, 0.0), world_frame(), (2.0, 3.0, 4.0))
            .execute()
            .unwrap();
        // 2 * (ab + ah + bh) = 2 * (6 + 8 + 12)
        assert!((surface_area(&mesh) - 52.0).abs() < 1e-9);
    }

    #[test]
    fn rotated_frame_preserves_volume() {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let frame = [
            Vector3::new(s, s, 0.0),
            Vector3::new(-s, s, 0.0),
            Vector3::z(),
        ];
        let mesh = MakeCuboid::new(Point3::new(0.0, 0.0, 0.0), frame, (1.0, 2.0, 3.0))
            .execute()
            .unwrap();
        assert!((signed_volume(&mesh) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_inputs_fail() {
        let c = Point3::new(0.0, 0.0, 0.0);
        assert!(MakeCuboid::new(c, world_frame(), (0.0, 1.0, 1.0))
            .execute()
            .is_err());
        let bad_frame = [Vector3::x(), Vector3::zeros(), Vector3::z()];
        assert!(MakeCuboid::new(c, bad_frame, (1.0, 1.0, 1.0))
            .execute()
            .is_err());
    }
}
