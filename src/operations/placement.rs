use crate::error::Result;
use crate::math::intersect_2d::rotate_ccw;
use crate::math::polyline_2d::sample_at_fraction;
use crate::math::{Point2, Point3, Vector2, Vector3};
use crate::mesh::TriangleMesh;
use crate::scene::{BoxSpec, GroundModel, PipeSpec, SphereSpec};

use super::creation::{CylinderMesh, MakeCuboid, MakeCylinder, MakeSphere};

/// Minimum gap kept between a placed primitive's envelope and any trench
/// surface.
pub const PLACEMENT_CLEARANCE: f64 = 0.02;

/// Wall taper never reports a half-width below this.
const MIN_HALF_WIDTH: f64 = 1e-6;

/// Local frame and ground anchor at a fractional position along the
/// centerline.
#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    /// Plan position on the centerline.
    pub position: Point2,
    /// Unit tangent of the containing segment.
    pub tangent: Vector2,
    /// Left-pointing unit normal.
    pub left_normal: Vector2,
    /// Ground elevation above the anchor.
    pub top_z: f64,
}

/// The trench interior seen by the placement engine: centerline, depth,
/// and the taper-dependent half-width.
///
/// Clamping is silent and total; a request is never rejected, only
/// repositioned.
pub struct TrenchEnvelope<'a> {
    path: &'a [Point2],
    half_top: f64,
    depth: f64,
    wall_slope: f64,
    ground: &'a dyn GroundModel,
}

impl<'a> TrenchEnvelope<'a> {
    /// Creates an envelope for a trench of the given top width, depth,
    /// and wall taper.
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
            half_top: width_top / 2.0,
            depth,
            wall_slope,
            ground,
        }
    }

    /// Samples the centerline at fractional arc length `s`.
    #[must_use]
    pub fn anchor(&self, s: f64) -> Anchor {
        let (position, tangent) = sample_at_fraction(self.path, s);
        Anchor {
            position,
            tangent,
            left_normal: rotate_ccw(tangent),
            top_z: self.ground.height(position.x, position.y),
        }
    }

    /// Trench half-width at elevation `z`, linearly narrowed by the wall
    /// taper per unit of depth below `top_z`.
    #[must_use]
    pub fn half_width_at(&self, top_z: f64, z: f64) -> f64 {
        (self.half_top - self.wall_slope * (top_z - z)).max(MIN_HALF_WIDTH)
    }

    /// Clamps a requested center elevation so the object's vertical
    /// envelope (half extent plus clearance) stays between floor and
    /// grade. With an object too tall for the trench the bounds cross
    /// and the upper bound wins, preserving the grade-side clearance.
    #[must_use]
    pub fn clamp_vertical(&self, top_z: f64, requested: f64, half_extent: f64) -> f64 {
        let reach = half_extent + PLACEMENT_CLEARANCE;
        let z_min = top_z - self.depth + reach;
        let z_max = top_z - reach;
        requested.max(z_min).min(z_max)
    }

    /// Clamps a requested lateral offset so the object's lateral envelope
    /// stays inside the half-width at its resolved elevation.
    #[must_use]
    pub fn clamp_lateral(&self, top_z: f64, z: f64, requested: f64, half_extent: f64) -> f64 {
        let half_width = self.half_width_at(top_z, z);
        let u_max = (half_width - (half_extent + PLACEMENT_CLEARANCE)).max(0.0);
        requested.clamp(-u_max, u_max)
    }
}

/// A pipe resolved into the trench, with its mesh pieces.
#[derive(Debug, Clone)]
pub struct PlacedPipe {
    /// Resolved world-space center.
    pub center: Point3,
    /// Resolved axis direction.
    pub axis: Vector3,
    /// Lateral surface.
    pub side: TriangleMesh,
    /// Cap at the negative axis end.
    pub cap_neg: TriangleMesh,
    /// Cap at the positive axis end.
    pub cap_pos: TriangleMesh,
}

/// Orients and clamps one pipe request inside the trench envelope.
pub struct PlacePipe<'a> {
    envelope: &'a TrenchEnvelope<'a>,
    spec: &'a PipeSpec,
}

impl<'a> PlacePipe<'a> {
    /// Creates a new `PlacePipe` operation.
    #[must_use]
    pub fn new(envelope: &'a TrenchEnvelope<'a>, spec: &'a PipeSpec) -> Self {
        Self { envelope, spec }
    }

    /// Executes the placement.
    ///
    /// # Errors
    ///
    /// Returns an error only if the cylinder builder rejects the pipe
    /// dimensions (validated earlier at the scene boundary).
    pub fn execute(&self) -> Result<PlacedPipe> {
        let anchor = self.envelope.anchor(self.spec.s_center);
        let angle = self.spec.angle_deg.to_radians();
        let (sin, cos) = angle.sin_cos();
        let t = anchor.tangent;
        let axis = Vector3::new(cos * t.x - sin * t.y, sin * t.x + cos * t.y, 0.0);

        let requested_z = self
            .spec
            .z
            .unwrap_or(anchor.top_z - self.envelope.depth * 0.5);
        let z = self
            .envelope
            .clamp_vertical(anchor.top_z, requested_z, self.spec.radius);
        let u = self
            .envelope
            .clamp_lateral(anchor.top_z, z, self.spec.offset_u, self.spec.radius);

        let plan = anchor.position + u * anchor.left_normal;
        let center = Point3::new(plan.x, plan.y, z);
        let parts = MakeCylinder::new(center, axis, self.spec.radius, self.spec.length)
            .with_resolution(self.spec.n_theta, self.spec.n_along)
            .execute()?;
        Ok(PlacedPipe {
            center,
            axis,
            side: parts.side,
            cap_neg: parts.cap_neg,
            cap_pos: parts.cap_pos,
        })
    }
}

/// A box resolved into the trench.
#[derive(Debug, Clone)]
pub struct PlacedCuboid {
    /// Resolved world-space center.
    pub center: Point3,
    /// Box mesh.
    pub mesh: TriangleMesh,
}

/// Orients and clamps one box request inside the trench envelope.
///
/// Boxes are aligned to the local frame (tangent, left normal, up) and
/// default to resting on the trench floor.
pub struct PlaceCuboid<'a> {
    envelope: &'a TrenchEnvelope<'a>,
    spec: &'a BoxSpec,
}

impl<'a> PlaceCuboid<'a> {
    /// Creates a new `PlaceCuboid` operation.
    #[must_use]
    pub fn new(envelope: &'a TrenchEnvelope<'a>, spec: &'a BoxSpec) -> Self {
        Self { envelope, spec }
    }

    /// Executes the placement.
    ///
    /// # Errors
    ///
    /// Returns an error only if the cuboid builder rejects the box
    /// dimensions (validated earlier at the scene boundary).
    pub fn execute(&self) -> Result<PlacedCuboid> {
        let anchor = self.envelope.anchor(self.spec.s);
        let half_height = self.spec.height * 0.5;

        let requested_z = self
            .spec
            .z
            .unwrap_or(anchor.top_z - self.envelope.depth + half_height);
        let z = self
            .envelope
            .clamp_vertical(anchor.top_z, requested_z, half_height);
        let u = self.envelope.clamp_lateral(
            anchor.top_z,
            z,
            self.spec.offset_u,
            self.spec.across * 0.5,
        );

        let plan = anchor.position + u * anchor.left_normal;
        let center = Point3::new(plan.x, plan.y, z);
        let frame = [
            Vector3::new(anchor.tangent.x, anchor.tangent.y, 0.0),
            Vector3::new(anchor.left_normal.x, anchor.left_normal.y, 0.0),
            Vector3::z(),
        ];
        let mesh = MakeCuboid::new(
            center,
            frame,
            (self.spec.along, self.spec.across, self.spec.height),
        )
        .execute()?;
        Ok(PlacedCuboid { center, mesh })
    }
}

/// A sphere resolved into the trench.
#[derive(Debug, Clone)]
pub struct PlacedSphere {
    /// Resolved world-space center.
    pub center: Point3,
    /// Sphere mesh.
    pub mesh: TriangleMesh,
}

/// Clamps one sphere request inside the trench envelope.
pub struct PlaceSphere<'a> {
    envelope: &'a TrenchEnvelope<'a>,
    spec: &'a SphereSpec,
}

impl<'a> PlaceSphere<'a> {
    /// Creates a new `PlaceSphere` operation.
    #[must_use]
    pub fn new(envelope: &'a TrenchEnvelope<'a>, spec: &'a SphereSpec) -> Self {
        Self { envelope, spec }
    }

    /// Executes the placement.
    ///
    /// # Errors
    ///
    /// Returns an error only if the sphere builder rejects the radius
    /// (validated earlier at the scene boundary).
    pub fn execute(&self) -> Result<PlacedSphere> {
        let anchor = self.envelope.anchor(self.spec.s);

        let requested_z = self
            .spec
            .z
            .unwrap_or(anchor.top_z - self.envelope.depth * 0.5);
        let z = self
            .envelope
            .clamp_vertical(anchor.top_z, requested_z, self.spec.radius);
        let u = self
            .envelope
            .clamp_lateral(anchor.top_z, z, self.spec.offset_u, self.spec.radius);

        let plan = anchor.position + u * anchor.left_normal;
        let center = Point3::new(plan.x, plan.y, z);
        let mesh = MakeSphere::new(center, self.spec.radius)
            .with_resolution(64, 32)
            .execute()?;
        Ok(PlacedSphere { center, mesh })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::scene::GroundPlane;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn straight_path() -> Vec<Point2> {
        vec![p(0.0, 0.0), p(3.0, 0.0)]
    }

    /// Asserts the envelope of a placed object respects depth and width
    /// bounds at its resolved elevation.
    fn assert_contained(env: &TrenchEnvelope, anchor: &Anchor, center: &Point3, half_extent: f64) {
        let eps = 1e-9;
        assert!(center.z + half_extent + PLACEMENT_CLEARANCE <= anchor.top_z + eps);
        assert!(
            center.z - half_extent - PLACEMENT_CLEARANCE >= anchor.top_z - env.depth - eps
        );
        let lateral = (Point2::new(center.x, center.y) - anchor.position).norm();
        let half_width = env.half_width_at(anchor.top_z, center.z);
        assert!(lateral + half_extent + PLACEMENT_CLEARANCE <= half_width + eps);
    }

    #[test]
    fn pipe_defaults_to_mid_depth() {
        let flat = GroundPlane::default();
        let path = straight_path();
        let env = TrenchEnvelope::new(&path, 1.0, 1.2, 0.0, &flat);
        let spec = PipeSpec::default();
        let placed = PlacePipe::new(&env, &spec).execute().unwrap();
        assert!((placed.center.z + 0.6).abs() < 1e-12);
        assert!((placed.center.x - 1.5).abs() < 1e-12);
    }

    #[test]
    fn wild_requests_are_clamped_inside() {
        let flat = GroundPlane::default();
        let path = straight_path();
        let env = TrenchEnvelope::new(&path, 1.0, 1.2, 0.1, &flat);
        for (z, u) in [(1e6, 1e6), (-1e6, -1e6), (0.0, 5.0), (-0.3, -2.0)] {
            let spec = SphereSpec {
                radius: 0.1,
                s: 0.5,
                offset_u: u,
                z: Some(z),
            };
            let placed = PlaceSphere::new(&env, &spec).execute().unwrap();
            let anchor = env.anchor(0.5);
            assert_contained(&env, &anchor, &placed.center, 0.1);
        }
    }

    #[test]
    fn box_rests_on_the_floor_by_default() {
        let flat = GroundPlane::default();
        let path = straight_path();
        let env = TrenchEnvelope::new(&path, 1.0, 1.2, 0.0, &flat);
        let spec = BoxSpec {
            along: 0.4,
            across: 0.3,
            height: 0.3,
            s: 0.5,
            offset_u: 0.0,
            z: None,
        };
        let placed = PlaceCuboid::new(&env, &spec).execute().unwrap();
        // Bottom anchoring puts the center half a height above the
        // floor, then the clearance clamp lifts it by the gap.
        assert!((placed.center.z - (-1.2 + 0.15 + PLACEMENT_CLEARANCE)).abs() < 1e-12);
    }

    #[test]
    fn box_lateral_clamp_respects_taper() {
        let flat = GroundPlane::default();
        let path = straight_path();
        let env = TrenchEnvelope::new(&path, 1.0, 1.2, 0.2, &flat);
        let spec = BoxSpec {
            along: 0.2,
            across: 0.2,
            height: 0.2,
            s: 0.5,
            offset_u: 10.0,
            z: None,
        };
        let placed = PlaceCuboid::new(&env, &spec).execute().unwrap();
        let anchor = env.anchor(0.5);
        assert_contained(&env, &anchor, &placed.center, 0.1);
        // The request pushed left; the resolved offset must sit exactly
        // on the clamped bound.
        let half_width = env.half_width_at(anchor.top_z, placed.center.z);
        let expected_u = half_width - (0.1 + PLACEMENT_CLEARANCE);
        assert!((placed.center.y - expected_u).abs() < 1e-9);
    }

    #[test]
    fn oversized_object_keeps_grade_side_clearance() {
        let flat = GroundPlane::default();
        let path = straight_path();
        let env = TrenchEnvelope::new(&path, 1.0, 0.5, 0.0, &flat);
        // Sphere taller than the trench: the crossed bounds resolve to
        // the grade-side limit.
        let spec = SphereSpec {
            radius: 0.4,
            s: 0.5,
            offset_u: 0.0,
            z: Some(0.0),
        };
        let placed = PlaceSphere::new(&env, &spec).execute().unwrap();
        assert!((placed.center.z - (-(0.4 + PLACEMENT_CLEARANCE))).abs() < 1e-12);
    }

    #[test]
    fn pipe_axis_rotates_with_angle() {
        let flat = GroundPlane::default();
        let path = straight_path();
        let env = TrenchEnvelope::new(&path, 2.0, 1.2, 0.0, &flat);
        let spec = PipeSpec {
            angle_deg: 90.0,
            ..PipeSpec::default()
        };
        let placed = PlacePipe::new(&env, &spec).execute().unwrap();
        assert!(placed.axis.x.abs() < 1e-12);
        assert!((placed.axis.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn anchor_tracks_sloped_ground() {
        let ground = GroundPlane::new(0.0, 1.0, 0.0);
        let path = straight_path();
        let env = TrenchEnvelope::new(&path, 1.0, 1.2, 0.0, &ground);
        let anchor = env.anchor(0.5);
        assert!((anchor.top_z - 1.5).abs() < 1e-12);
        let spec = PipeSpec::default();
        let placed = PlacePipe::new(&env, &spec).execute().unwrap();
        // Mid-depth below the local grade, not below a flat datum.
        assert!((placed.center.z - (1.5 - 0.6)).abs() < 1e-12);
    }

    #[test]
    fn half_width_narrows_with_depth() {
        let flat = GroundPlane::default();
        let path = straight_path();
        let env = TrenchEnvelope::new(&path, 1.0, 1.2, 0.1, &flat);
        assert!((env.half_width_at(0.0, 0.0) - 0.5).abs() < 1e-12);
        assert!((env.half_width_at(0.0, -1.2) - 0.38).abs() < 1e-12);
        // Far below any sensible depth the clamp keeps it positive.
        assert!(env.half_width_at(0.0, -1e6) >= MIN_HALF_WIDTH);
    }
}
