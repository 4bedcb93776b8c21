use crate::error::Result;
use crate::math::polygon_2d::ensure_ccw;
use crate::math::{Point2, Point3};
use crate::mesh::TriangleMesh;
use crate::scene::GroundModel;

use super::offset::{OffsetChains, OffsetPolyline};
use super::triangulate::Triangulate;

/// Group name of the trench floor.
pub const TRENCH_BOTTOM_GROUP: &str = "trench_bottom";
/// Group name of the fictitious lid closing the cavity for volume
/// computation.
pub const TRENCH_CAP_GROUP: &str = "trench_cap_for_volume";
/// Group name of the trench walls.
pub const TRENCH_WALLS_GROUP: &str = "trench_walls";

/// Wall taper never narrows the floor below this half-width.
const MIN_HALF_WIDTH_BOTTOM: f64 = 1e-3;

/// Resolved widths of the trench cross-section.
#[derive(Debug, Clone, Copy)]
pub struct TrenchFootprint {
    /// Top opening width.
    pub width_top: f64,
    /// Floor width after wall taper, clamped positive.
    pub width_bottom: f64,
}

/// The assembled trench surface groups.
#[derive(Debug, Clone)]
pub struct TrenchSurfaces {
    /// Floor of the cavity, wound to face down/outward.
    pub bottom: TriangleMesh,
    /// Top cap at grade, wound to face up.
    pub cap: TriangleMesh,
    /// Wall strip connecting the two rings.
    pub walls: TriangleMesh,
    /// Resolved cross-section widths.
    pub footprint: TrenchFootprint,
    /// Triangulation stall-fallback count across both rings.
    pub fan_fallbacks: usize,
}

/// Builds the capped, walled trench surface around a centerline, anchored
/// to a ground model.
///
/// The top ring lies on the ground surface and the bottom ring tracks it
/// at `depth` below, so trenches on sloped ground stay parallel to
/// grade. Each wall segment gets its own vertex quadruple; sharing
/// vertices across segments would smear the sloped-wall orientation at
/// the joints.
pub struct BuildTrench<'a> {
    path: &'a [Point2],
    width_top: f64,
    depth: f64,
    wall_slope: f64,
    ground: &'a dyn GroundModel,
}

impl<'a> BuildTrench<'a> {
    /// Creates a new `BuildTrench` operation.
    #[must_use]
    pub fn new(
        path: &'a [Point2],
        width_top: f64,
        depth: f64,
        wall_slope: f64,
        ground: &'a dyn GroundModel,
    ) -> Self {
        Self {
            path,
            width_top,
            depth,
            wall_slope,
            ground,
        }
    }

    /// Executes the assembly.
    ///
    /// # Errors
    ///
    /// Returns an error if the centerline has fewer than 2 points or a
    /// ring fails to triangulate.
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(&self) -> Result<TrenchSurfaces> {
        let half_top = self.width_top / 2.0;
        let shrink = (self.wall_slope * self.depth).max(0.0);
        let half_bot = (half_top - shrink).max(MIN_HALF_WIDTH_BOTTOM);

        let ring_top = ensure_ccw(ring_from_chains(
            OffsetPolyline::new(self.path.to_vec(), half_top).execute()?,
        ));
        let ring_bot = ensure_ccw(ring_from_chains(
            OffsetPolyline::new(self.path.to_vec(), half_bot).execute()?,
        ));
        debug_assert_eq!(ring_top.len(), ring_bot.len());

        let tri_top = Triangulate::new(ring_top.clone()).execute()?;
        let tri_bot = Triangulate::new(ring_bot.clone()).execute()?;

        let cap_vertices: Vec<Point3> = ring_top
            .iter()
            .map(|p| Point3::new(p.x, p.y, self.ground.height(p.x, p.y)))
            .collect();
        let bottom_vertices: Vec<Point3> = ring_bot
            .iter()
            .map(|p| Point3::new(p.x, p.y, self.ground.height(p.x, p.y) - self.depth))
            .collect();

        // The bottom is the floor of a cavity viewed from above: reverse
        // each triangle so it faces down.
        let bottom_indices: Vec<[u32; 3]> = tri_bot
            .triangles
            .iter()
            .map(|&[a, b, c]| [c, b, a])
            .collect();

        let mut walls = TriangleMesh::default();
        let n = ring_top.len();
        for i in 0..n {
            let j = (i + 1) % n;
            let base = walls.vertices.len() as u32;
            walls.vertices.extend([
                cap_vertices[i],
                cap_vertices[j],
                bottom_vertices[j],
                bottom_vertices[i],
            ]);
            walls.indices.push([base, base + 1, base + 2]);
            walls.indices.push([base, base + 2, base + 3]);
        }

        Ok(TrenchSurfaces {
            bottom: TriangleMesh::new(bottom_vertices, bottom_indices),
            cap: TriangleMesh::new(cap_vertices, tri_top.triangles),
            walls,
            footprint: TrenchFootprint {
                width_top: self.width_top,
                width_bottom: 2.0 * half_bot,
            },
            fan_fallbacks: tri_top.fan_fallbacks + tri_bot.fan_fallbacks,
        })
    }
}

/// Closes the two offset chains into a single ring: the left chain
/// followed by the right chain reversed.
fn ring_from_chains(chains: OffsetChains) -> Vec<Point2> {
    let mut ring = chains.left;
    ring.extend(chains.right.into_iter().rev());
    ring
}
