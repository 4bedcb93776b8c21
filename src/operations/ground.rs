use crate::error::Result;
use crate::math::polygon_2d::signed_area_2d;
use crate::math::{Point2, Point3};
use crate::mesh::TriangleMesh;
use crate::scene::GroundModel;

use super::offset::OffsetPolyline;

/// Group name of the rectangular ground surface.
pub const GROUND_SURFACE_GROUP: &str = "ground_surface";
/// Group name of the left ground ribbon.
pub const GROUND_LEFT_STRIP_GROUP: &str = "ground_left_strip";
/// Group name of the right ground ribbon.
pub const GROUND_RIGHT_STRIP_GROUP: &str = "ground_right_strip";

/// Builds a single rectangular ground plane spanning the trench opening
/// plus a margin, heighted by the ground model.
pub struct BuildGroundPlane<'a> {
    path: &'a [Point2],
    width_top: f64,
    size_margin: f64,
    ground: &'a dyn GroundModel,
}

impl<'a> BuildGroundPlane<'a> {
    /// Creates a new `BuildGroundPlane` operation.
    #[must_use]
    pub fn new(
        path: &'a [Point2],
        width_top: f64,
        size_margin: f64,
        ground: &'a dyn GroundModel,
    ) -> Self {
        Self {
            path,
            width_top,
            size_margin,
            ground,
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the centerline has fewer than 2 points.
    pub fn execute(&self) -> Result<TriangleMesh> {
        let chains = OffsetPolyline::new(self.path.to_vec(), self.width_top / 2.0).execute()?;

        let mut min = chains.left[0];
        let mut max = chains.left[0];
        for p in chains.left.iter().chain(&chains.right) {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        let m = self.size_margin.max(1.0);

        // Corner order is CCW by construction, so the up-facing split is
        // fixed.
        let corners = [
            Point2::new(min.x - m, min.y - m),
            Point2::new(max.x + m, min.y - m),
            Point2::new(max.x + m, max.y + m),
            Point2::new(min.x - m, max.y + m),
        ];
        let vertices = corners
            .iter()
            .map(|p| Point3::new(p.x, p.y, self.ground.height(p.x, p.y)))
            .collect();
        Ok(TriangleMesh::new(vertices, vec![[0, 1, 2], [0, 2, 3]]))
    }
}

/// The two ground ribbons flanking the trench opening.
#[derive(Debug, Clone)]
pub struct GroundStrips {
    /// Ribbon between the centerline and the left offset chain.
    pub left: TriangleMesh,
    /// Ribbon between the centerline and the right offset chain.
    pub right: TriangleMesh,
}

/// Builds the two ground ribbons connecting the centerline to the
/// top-width offset chains, one quad per centerline segment.
pub struct BuildGroundStrips<'a> {
    path: &'a [Point2],
    width_top: f64,
    ground: &'a dyn GroundModel,
}

impl<'a> BuildGroundStrips<'a> {
    /// Creates a new `BuildGroundStrips` operation.
    #[must_use]
    pub fn new(path: &'a [Point2], width_top: f64, ground: &'a dyn GroundModel) -> Self {
        Self {
            path,
            width_top,
            ground,
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the centerline has fewer than 2 points.
    pub fn execute(&self) -> Result<GroundStrips> {
        let chains = OffsetPolyline::new(self.path.to_vec(), self.width_top / 2.0).execute()?;

        let mut left = TriangleMesh::default();
        let mut right = TriangleMesh::default();
        for i in 0..self.path.len() - 1 {
            push_ground_quad(
                &mut left,
                [
                    chains.left[i],
                    chains.left[i + 1],
                    self.path[i + 1],
                    self.path[i],
                ],
                self.ground,
            );
            push_ground_quad(
                &mut right,
                [
                    self.path[i],
                    self.path[i + 1],
                    chains.right[i + 1],
                    chains.right[i],
                ],
                self.ground,
            );
        }
        Ok(GroundStrips { left, right })
    }
}

/// Appends a plan-view quad as two up-facing triangles, normalizing the
/// winding to CCW before lifting onto the ground surface.
#[allow(clippy::cast_possible_truncation)]
fn push_ground_quad(mesh: &mut TriangleMesh, quad: [Point2; 4], ground: &dyn GroundModel) {
    let mut plan = quad.to_vec();
    if signed_area_2d(&plan) < 0.0 {
        plan.reverse();
    }
    let base = mesh.vertices.len() as u32;
    mesh.vertices.extend(
        plan.iter()
            .map(|p| Point3::new(p.x, p.y, ground.height(p.x, p.y))),
    );
    mesh.indices.push([base, base + 1, base + 2]);
    mesh.indices.push([base, base + 2, base + 3]);
}
