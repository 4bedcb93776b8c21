use std::f64::consts::{PI, TAU};

use crate::error::{GeometryError, Result};
use crate::math::{Point3, TOLERANCE};
use crate::mesh::TriangleMesh;

/// Creates a UV sphere mesh (latitude/longitude lattice).
///
/// The poles are included as degenerate rings and the longitude seam
/// vertex is duplicated; the standard quad split gives outward winding
/// everywhere.
pub struct MakeSphere {
    center: Point3,
    radius: f64,
    n_theta: usize,
    n_phi: usize,
}

impl MakeSphere {
    /// Creates a new `MakeSphere` operation with default resolution.
    #[must_use]
    pub fn new(center: Point3, radius: f64) -> Self {
        Self {
            center,
            radius,
            n_theta: 48,
            n_phi: 24,
        }
    }

    /// Sets the longitudinal and latitudinal resolution.
    ///
    /// Clamped to at least 8 around and 4 between the poles.
    #[must_use]
    pub fn with_resolution(mut self, n_theta: usize, n_phi: usize) -> Self {
        self.n_theta = n_theta;
        self.n_phi = n_phi;
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if the radius is not positive.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn execute(&self) -> Result<TriangleMesh> {
        if self.radius < TOLERANCE {
            return Err(GeometryError::Degenerate("sphere radius must be positive".into()).into());
        }
        let n_theta = self.n_theta.max(8);
        let n_phi = self.n_phi.max(4);
        let r = self.radius;

        let mut mesh = TriangleMesh::default();
        for j in 0..=n_phi {
            let phi = PI * (j as f64) / (n_phi as f64);
            for i in 0..=n_theta {
                let th = TAU * (i as f64) / (n_theta as f64);
                mesh.vertices.push(Point3::new(
                    self.center.x + r * phi.sin() * th.cos(),
                    self.center.y + r * phi.sin() * th.sin(),
                    self.center.z + r * phi.cos(),
                ));
            }
        }

        let idx = |i: usize, j: usize| (j * (n_theta + 1) + i) as u32;
        for j in 0..n_phi {
            for i in 0..n_theta {
                let v00 = idx(i, j);
                let v10 = idx(i + 1, j);
                let v01 = idx(i, j + 1);
                let v11 = idx(i + 1, j + 1);
                mesh.indices.push([v00, v01, v11]);
                mesh.indices.push([v00, v11, v10]);
            }
        }
        Ok(mesh)
    }
}
