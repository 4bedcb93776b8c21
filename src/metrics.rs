use indexmap::IndexMap;

use crate::mesh::{GroupSet, TriangleMesh};
use crate::operations::trench::{
    TrenchFootprint, TRENCH_BOTTOM_GROUP, TRENCH_CAP_GROUP, TRENCH_WALLS_GROUP,
};

/// Relative tolerance for the two-way volume cross-check. Both methods
/// integrate the same flux exactly, so disagreement beyond rounding
/// indicates a winding or orientation defect in mesh assembly.
pub const VOLUME_RELATIVE_TOLERANCE: f64 = 1e-6;

/// Total surface area of a mesh (half cross-product magnitude per
/// triangle).
#[must_use]
pub fn surface_area(mesh: &TriangleMesh) -> f64 {
    let mut total = 0.0;
    for t in 0..mesh.indices.len() {
        let [p0, p1, p2] = mesh.triangle(t);
        total += (p1 - p0).cross(&(p2 - p0)).norm() * 0.5;
    }
    total
}

/// Signed volume of a closed surface by tetrahedral decomposition from
/// the origin: `sum of p0 . (p1 x p2) / 6`.
///
/// Sign convention: a consistently outward-oriented closed surface
/// yields a positive value; the assembled trench cavity set
/// (bottom + walls + cap) integrates negative.
#[must_use]
pub fn signed_volume(mesh: &TriangleMesh) -> f64 {
    let mut total = 0.0;
    for t in 0..mesh.indices.len() {
        let [p0, p1, p2] = mesh.triangle(t);
        total += p0.coords.dot(&p1.coords.cross(&p2.coords));
    }
    total / 6.0
}

/// Signed volume of a closed surface as the divergence-theorem flux of
/// `F = r / 3` through it, evaluated exactly per flat triangle at the
/// centroid.
#[must_use]
pub fn flux_volume(mesh: &TriangleMesh) -> f64 {
    let mut total = 0.0;
    for t in 0..mesh.indices.len() {
        let [p0, p1, p2] = mesh.triangle(t);
        let centroid = (p0.coords + p1.coords + p2.coords) / 3.0;
        let normal = (p1 - p0).cross(&(p2 - p0));
        total += (centroid / 3.0).dot(&normal) / 2.0;
    }
    total
}

/// Validation metrics derived from a final group set.
#[derive(Debug, Clone)]
pub struct SceneMetrics {
    /// Surface area of every group, in registry order.
    pub surface_area_by_group: IndexMap<String, f64>,
    /// Trench cavity volume via tetrahedral decomposition.
    pub volume_from_surface: f64,
    /// Trench cavity volume via the divergence-theorem flux integral.
    pub volume_flux_integral: f64,
    /// Set when the two volume computations disagree beyond
    /// [`VOLUME_RELATIVE_TOLERANCE`]; a reported condition, not an
    /// error.
    pub volume_mismatch: bool,
    /// Surface area of the top cap group.
    pub footprint_area_top: f64,
    /// Surface area of the bottom group.
    pub footprint_area_bottom: f64,
    /// Resolved top opening width.
    pub width_top: f64,
    /// Resolved bottom width after wall taper.
    pub width_bottom: f64,
}

/// Computes validation metrics over an assembled group set.
pub struct ComputeMetrics<'a> {
    groups: &'a GroupSet,
    footprint: &'a TrenchFootprint,
}

impl<'a> ComputeMetrics<'a> {
    /// Creates a new metrics query.
    #[must_use]
    pub fn new(groups: &'a GroupSet, footprint: &'a TrenchFootprint) -> Self {
        Self { groups, footprint }
    }

    /// Executes the query.
    #[must_use]
    pub fn execute(&self) -> SceneMetrics {
        let surface_area_by_group: IndexMap<String, f64> = self
            .groups
            .iter()
            .map(|(name, mesh)| (name.to_owned(), surface_area(mesh)))
            .collect();

        let closed = self.groups.combined(&[
            TRENCH_WALLS_GROUP,
            TRENCH_BOTTOM_GROUP,
            TRENCH_CAP_GROUP,
        ]);
        let (volume_from_surface, volume_flux_integral) = if closed.is_empty() {
            (0.0, 0.0)
        } else {
            (signed_volume(&closed), flux_volume(&closed))
        };
        let scale = volume_from_surface.abs().max(volume_flux_integral.abs());
        let volume_mismatch =
            (volume_from_surface - volume_flux_integral).abs() > VOLUME_RELATIVE_TOLERANCE * scale;

        let area_of = |name: &str| surface_area_by_group.get(name).copied().unwrap_or(0.0);
        SceneMetrics {
            footprint_area_top: area_of(TRENCH_CAP_GROUP),
            footprint_area_bottom: area_of(TRENCH_BOTTOM_GROUP),
            surface_area_by_group,
            volume_from_surface,
            volume_flux_integral,
            volume_mismatch,
            width_top: self.footprint.width_top,
            width_bottom: self.footprint.width_bottom,
        }
    }
}
