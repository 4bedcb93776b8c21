use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::mesh::TriangleMesh;

/// The three surface pieces of a capped cylinder.
#[derive(Debug, Clone)]
pub struct CylinderMesh {
    /// Lateral surface (ring-and-rung lattice).
    pub side: TriangleMesh,
    /// End cap at the negative axis end.
    pub cap_neg: TriangleMesh,
    /// End cap at the positive axis end.
    pub cap_pos: TriangleMesh,
}

/// Creates a capped cylinder mesh centered on a point, aligned to an
/// axis direction.
///
/// Vertices are emitted directly in world space: the lattice is built in
/// a local frame (radius in the u/w plane, length along the axis) and
/// mapped through a right-handed `(u, axis, w)` frame derived from the
/// axis. All windings face outward.
pub struct MakeCylinder {
    center: Point3,
    axis: Vector3,
    radius: f64,
    length: f64,
    n_theta: usize,
    n_along: usize,
}

impl MakeCylinder {
    /// Creates a new `MakeCylinder` operation with default resolution.
    #[must_use]
    pub fn new(center: Point3, axis: Vector3, radius: f64, length: f64) -> Self {
        Self {
            center,
            axis,
            radius,
            length,
            n_theta: 64,
            n_along: 32,
        }
    }

    /// Sets the circumferential and axial tessellation resolution.
    ///
    /// Clamped to at least 8 around and 1 along.
    #[must_use]
    pub fn with_resolution(mut self, n_theta: usize, n_along: usize) -> Self {
        self.n_theta = n_theta;
        self.n_along = n_along;
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if the radius or length is not
    /// positive, or the axis direction is degenerate.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn execute(&self) -> Result<CylinderMesh> {
        if self.radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("cylinder radius must be positive".into()).into(),
            );
        }
        if self.length < TOLERANCE {
            return Err(
                GeometryError::Degenerate("cylinder length must be positive".into()).into(),
            );
        }
        let frame = frame_from_axis(&self.axis)?;
        let to_world = |x: f64, y: f64, z: f64| -> Point3 {
            self.center + frame[0] * x + frame[1] * y + frame[2] * z
        };

        let n_theta = self.n_theta.max(8);
        let n_along = self.n_along.max(1);
        let r = self.radius;
        let half = self.length / 2.0;

        // Lateral lattice; the seam vertex at theta = 2*pi is duplicated.
        let mut side = TriangleMesh::default();
        for j in 0..=n_along {
            let y = -half + self.length * (j as f64) / (n_along as f64);
            for i in 0..=n_theta {
                let th = TAU * (i as f64) / (n_theta as f64);
                side.vertices.push(to_world(r * th.cos(), y, r * th.sin()));
            }
        }
        let idx = |i: usize, j: usize| (j * (n_theta + 1) + i) as u32;
        for j in 0..n_along {
            for i in 0..n_theta {
                let v00 = idx(i, j);
                let v10 = idx(i + 1, j);
                let v01 = idx(i, j + 1);
                let v11 = idx(i + 1, j + 1);
                side.indices.push([v00, v01, v11]);
                side.indices.push([v00, v11, v10]);
            }
        }

        let cap = |y: f64, outward_negative: bool| -> TriangleMesh {
            let mut mesh = TriangleMesh::default();
            mesh.vertices.push(to_world(0.0, y, 0.0));
            for i in 0..n_theta {
                let th = TAU * (i as f64) / (n_theta as f64);
                mesh.vertices.push(to_world(r * th.cos(), y, r * th.sin()));
            }
            let ring = n_theta as u32;
            for i in 0..ring {
                let next = (i + 1) % ring;
                if outward_negative {
                    mesh.indices.push([0, 1 + next, 1 + i]);
                } else {
                    mesh.indices.push([0, 1 + i, 1 + next]);
                }
            }
            mesh
        };

        Ok(CylinderMesh {
            side,
            cap_neg: cap(-half, true),
            cap_pos: cap(half, false),
        })
    }
}

/// Builds a right-handed orthonormal frame `(u, v, w)` whose `v` axis is
/// the given direction.
///
/// The helper for orthogonalization is world Z, or world X when the axis
/// is within tolerance of Z.
fn frame_from_axis(axis: &Vector3) -> Result<[Vector3; 3]> {
    let len = axis.norm();
    if len < TOLERANCE {
        return Err(GeometryError::ZeroVector.into());
    }
    let v = axis / len;
    let helper = if v.z.abs() > 0.99 {
        Vector3::x()
    } else {
        Vector3::z()
    };
    let u = helper.cross(&v).normalize();
    let w = u.cross(&v);
    Ok([u, v, w])
}
