use crate::math::{Vector3, TOLERANCE};

use super::TriangleMesh;

/// Per-vertex normals by area-weighted accumulation of adjacent face
/// normals.
///
/// Each triangle's unnormalized cross product (twice its area times its
/// unit normal) is scatter-added into the slots of its three vertices,
/// then each slot is normalized. A vertex with a zero-length
/// accumulation (isolated, or cancelling faces) keeps its accumulated
/// value divided by unit length instead of faulting.
#[must_use]
pub fn vertex_normals(mesh: &TriangleMesh) -> Vec<Vector3> {
    let mut accum = vec![Vector3::zeros(); mesh.vertices.len()];
    for tri in &mesh.indices {
        let p0 = mesh.vertices[tri[0] as usize];
        let p1 = mesh.vertices[tri[1] as usize];
        let p2 = mesh.vertices[tri[2] as usize];
        let face = (p1 - p0).cross(&(p2 - p0));
        for &i in tri {
            accum[i as usize] += face;
        }
    }
    for n in &mut accum {
        let len = n.norm();
        if len > TOLERANCE {
            *n /= len;
        }
    }
    accum
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;

    #[test]
    fn flat_quad_normals_point_up() {
        let mesh = TriangleMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        );
        for n in vertex_normals(&mesh) {
            assert!((n.z - 1.0).abs() < TOLERANCE);
            assert!(n.x.abs() < TOLERANCE && n.y.abs() < TOLERANCE);
        }
    }

    #[test]
    fn area_weighting_favors_larger_face() {
        // Vertex 0 is shared by a big +Z face and a small +X face; the
        // accumulated normal leans toward +Z.
        let mesh = TriangleMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(4.0, 0.0, 0.0),
                Point3::new(0.0, 4.0, 0.0),
                Point3::new(0.0, 0.1, 0.1),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        );
        let normals = vertex_normals(&mesh);
        assert!(normals[0].z > normals[0].x.abs());
    }

    #[test]
    fn isolated_vertex_keeps_zero_without_fault() {
        let mesh = TriangleMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(9.0, 9.0, 9.0),
            ],
            vec![[0, 1, 2]],
        );
        let normals = vertex_normals(&mesh);
        assert!(normals[3].norm() < TOLERANCE);
        assert!(normals[3].x.is_finite());
    }

    #[test]
    fn normals_are_unit_length() {
        let mesh = TriangleMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 2.0, 1.0),
            ],
            vec![[0, 1, 2]],
        );
        for n in vertex_normals(&mesh) {
            assert!((n.norm() - 1.0).abs() < 1e-9);
        }
    }
}
