use crate::error::Result;
use crate::mesh::GroupSet;
use crate::metrics::{ComputeMetrics, SceneMetrics};
use crate::operations::ground::{
    BuildGroundPlane, BuildGroundStrips, GROUND_LEFT_STRIP_GROUP, GROUND_RIGHT_STRIP_GROUP,
    GROUND_SURFACE_GROUP,
};
use crate::operations::noise::ApplyNoise;
use crate::operations::placement::{PlaceCuboid, PlacePipe, PlaceSphere, TrenchEnvelope};
use crate::operations::trench::{
    BuildTrench, TRENCH_BOTTOM_GROUP, TRENCH_CAP_GROUP, TRENCH_WALLS_GROUP,
};
use crate::scene::SceneSpec;

/// Fraction of `radius * clearance_scale` reported as the meshing
/// clearance for each pipe.
const PIPE_CLEARANCE_FACTOR: f64 = 0.5;

/// Number of primitives emitted per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectCounts {
    /// Pipes placed.
    pub pipes: usize,
    /// Boxes placed.
    pub boxes: usize,
    /// Spheres placed.
    pub spheres: usize,
}

/// Clearance metadata handed to the volumetric meshing collaborator.
#[derive(Debug, Clone, Copy)]
pub struct PipeClearance {
    /// Pipe radius.
    pub radius: f64,
    /// Configured clearance scale from the request.
    pub clearance_scale: f64,
    /// Resulting clearance distance.
    pub clearance: f64,
}

/// A named camera orientation for the rendering collaborator.
#[derive(Debug, Clone)]
pub struct ViewAngle {
    /// View name; keys the returned image bytes.
    pub name: String,
    /// Camera elevation in degrees.
    pub elevation: f64,
    /// Camera azimuth in degrees.
    pub azimuth: f64,
}

impl ViewAngle {
    /// Creates a named view.
    #[must_use]
    pub fn new(name: impl Into<String>, elevation: f64, azimuth: f64) -> Self {
        Self {
            name: name.into(),
            elevation,
            azimuth,
        }
    }
}

/// The standard top / side / oblique preview set.
#[must_use]
pub fn default_views() -> Vec<ViewAngle> {
    vec![
        ViewAngle::new("top", 90.0, 0.0),
        ViewAngle::new("side", 0.0, 0.0),
        ViewAngle::new("oblique", 22.0, -60.0),
    ]
}

/// Rendering collaborator boundary: consumes the final group mapping and
/// view angles, returns opaque image bytes per view name. The core never
/// inspects image content.
pub trait PreviewRenderer {
    /// Renders one image per view.
    fn render(&self, groups: &GroupSet, views: &[ViewAngle]) -> Vec<(String, Vec<u8>)>;
}

/// Everything produced by one synthesis run. Immutable after
/// construction; owned by the caller.
#[derive(Debug)]
pub struct SynthesisResult {
    /// All mesh groups, in emission order.
    pub groups: GroupSet,
    /// Validation metrics over the final groups.
    pub metrics: SceneMetrics,
    /// Primitive counts per kind.
    pub object_counts: ObjectCounts,
    /// Per-pipe clearance metadata for the volumetric collaborator.
    pub pipe_clearances: Vec<PipeClearance>,
    /// Preview bytes per view name; empty without a renderer.
    pub previews: Vec<(String, Vec<u8>)>,
}

/// Runs the full synthesis pipeline for one scene specification:
/// trench surfaces, ground surface, primitive placement, the optional
/// noise pass, and metrics.
///
/// Rendering is an explicit capability resolved by the caller once; the
/// engine itself performs no I/O.
pub struct SynthesizeScene<'a> {
    spec: &'a SceneSpec,
    renderer: Option<&'a dyn PreviewRenderer>,
    views: Vec<ViewAngle>,
}

impl<'a> SynthesizeScene<'a> {
    /// Creates a synthesis run over a scene specification.
    #[must_use]
    pub fn new(spec: &'a SceneSpec) -> Self {
        Self {
            spec,
            renderer: None,
            views: default_views(),
        }
    }

    /// Enables preview rendering through the given collaborator.
    #[must_use]
    pub fn with_renderer(mut self, renderer: &'a dyn PreviewRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Replaces the default top/side/oblique view set.
    #[must_use]
    pub fn with_views(mut self, views: Vec<ViewAngle>) -> Self {
        self.views = views;
        self
    }

    /// Executes the run.
    ///
    /// # Errors
    ///
    /// Fails fast on a malformed scene specification; geometry stages
    /// only error on inputs the validation already rejects.
    pub fn execute(&self) -> Result<SynthesisResult> {
        let spec = self.spec;
        spec.validate()?;
        let ground = spec.ground.plane();
        let mut groups = GroupSet::new();

        let trench = BuildTrench::new(
            &spec.path_xy,
            spec.width,
            spec.depth,
            spec.wall_slope,
            &ground,
        )
        .execute()?;
        groups.insert(TRENCH_BOTTOM_GROUP, trench.bottom);
        groups.insert(TRENCH_CAP_GROUP, trench.cap);
        groups.insert(TRENCH_WALLS_GROUP, trench.walls);

        if spec.ground.size_margin > 0.0 {
            let plane =
                BuildGroundPlane::new(&spec.path_xy, spec.width, spec.ground.size_margin, &ground)
                    .execute()?;
            groups.insert(GROUND_SURFACE_GROUP, plane);
        } else {
            let strips = BuildGroundStrips::new(&spec.path_xy, spec.width, &ground).execute()?;
            groups.insert(GROUND_LEFT_STRIP_GROUP, strips.left);
            groups.insert(GROUND_RIGHT_STRIP_GROUP, strips.right);
        }

        let envelope = TrenchEnvelope::new(
            &spec.path_xy,
            spec.width,
            spec.depth,
            spec.wall_slope,
            &ground,
        );

        let mut pipe_clearances = Vec::with_capacity(spec.pipes.len());
        for (i, pipe) in spec.pipes.iter().enumerate() {
            let placed = PlacePipe::new(&envelope, pipe).execute()?;
            groups.insert(format!("pipe{i}_side"), placed.side);
            groups.insert(format!("pipe{i}_cap_neg"), placed.cap_neg);
            groups.insert(format!("pipe{i}_cap_pos"), placed.cap_pos);
            pipe_clearances.push(PipeClearance {
                radius: pipe.radius,
                clearance_scale: pipe.clearance_scale,
                clearance: PIPE_CLEARANCE_FACTOR * pipe.radius * pipe.clearance_scale,
            });
        }
        for (i, cuboid) in spec.boxes.iter().enumerate() {
            let placed = PlaceCuboid::new(&envelope, cuboid).execute()?;
            groups.insert(format!("box{i}"), placed.mesh);
        }
        for (i, sphere) in spec.spheres.iter().enumerate() {
            let placed = PlaceSphere::new(&envelope, sphere).execute()?;
            groups.insert(format!("sphere{i}"), placed.mesh);
        }

        if spec.noise.enable {
            groups = ApplyNoise::new(&spec.noise).execute(&groups);
        }

        let metrics = ComputeMetrics::new(&groups, &trench.footprint).execute();
        let previews = self
            .renderer
            .map(|r| r.render(&groups, &self.views))
            .unwrap_or_default();

        Ok(SynthesisResult {
            groups,
            metrics,
            object_counts: ObjectCounts {
                pipes: spec.pipes.len(),
                boxes: spec.boxes.len(),
                spheres: spec.spheres.len(),
            },
            pipe_clearances,
            previews,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use crate::scene::{BoxSpec, GroundSpec, PipeSpec, SphereSpec};
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    /// The straight reference scenario: 3 m run, width 1.0, depth 1.2,
    /// wall slope 0.1, flat ground.
    fn reference_spec() -> SceneSpec {
        let mut spec = SceneSpec::new(vec![p(0.0, 0.0), p(3.0, 0.0)], 1.0, 1.2);
        spec.wall_slope = 0.1;
        spec.ground = GroundSpec {
            z0: 0.0,
            slope_x: 0.0,
            slope_y: 0.0,
            size_margin: 2.0,
        };
        spec
    }

    #[test]
    fn reference_scenario_metrics() {
        let spec = reference_spec();
        let result = SynthesizeScene::new(&spec).execute().unwrap();
        let m = &result.metrics;

        assert_relative_eq!(m.width_top, 1.0, max_relative = 1e-12);
        // 2 * (0.5 - 0.1 * 1.2)
        assert_relative_eq!(m.width_bottom, 0.76, max_relative = 1e-12);
        assert_relative_eq!(m.footprint_area_top, 3.0, max_relative = 1e-9);
        assert_relative_eq!(m.footprint_area_bottom, 3.0 * 0.76, max_relative = 1e-9);

        // The cavity set integrates negative; both volume methods agree.
        assert!(m.volume_from_surface < 0.0);
        assert!(!m.volume_mismatch);
        assert_relative_eq!(
            m.volume_from_surface,
            m.volume_flux_integral,
            max_relative = 1e-6
        );
    }

    #[test]
    fn group_emission_order_starts_with_trench_bottom() {
        let spec = reference_spec();
        let result = SynthesizeScene::new(&spec).execute().unwrap();
        let names: Vec<&str> = result.groups.names().collect();
        assert_eq!(
            names,
            [
                "trench_bottom",
                "trench_cap_for_volume",
                "trench_walls",
                "ground_surface"
            ]
        );
    }

    #[test]
    fn pipe_groups_and_clearance_metadata() {
        let mut spec = reference_spec();
        spec.pipes.push(PipeSpec {
            radius: 0.1,
            length: 1.8,
            angle_deg: 0.0,
            s_center: 0.5,
            z: Some(-0.6),
            offset_u: 0.0,
            n_theta: 24,
            n_along: 8,
            clearance_scale: 0.75,
        });
        let result = SynthesizeScene::new(&spec).execute().unwrap();

        for name in ["pipe0_side", "pipe0_cap_neg", "pipe0_cap_pos"] {
            assert!(result.groups.contains(name), "missing group {name}");
        }
        assert_eq!(
            result.object_counts,
            ObjectCounts {
                pipes: 1,
                boxes: 0,
                spheres: 0
            }
        );
        assert_eq!(result.pipe_clearances.len(), 1);
        let clearance = &result.pipe_clearances[0];
        assert_relative_eq!(clearance.radius, 0.1, max_relative = 1e-12);
        assert_relative_eq!(clearance.clearance_scale, 0.75, max_relative = 1e-12);
        assert_relative_eq!(clearance.clearance, 0.0375, max_relative = 1e-9);
    }

    #[test]
    fn boxes_and_spheres_get_indexed_groups() {
        let mut spec = reference_spec();
        spec.boxes.push(BoxSpec::default());
        spec.boxes.push(BoxSpec {
            s: 0.2,
            ..BoxSpec::default()
        });
        spec.spheres.push(SphereSpec {
            radius: 0.1,
            ..SphereSpec::default()
        });
        let result = SynthesizeScene::new(&spec).execute().unwrap();
        assert!(result.groups.contains("box0"));
        assert!(result.groups.contains("box1"));
        assert!(result.groups.contains("sphere0"));
        assert_eq!(result.object_counts.boxes, 2);
        assert_eq!(result.object_counts.spheres, 1);
    }

    #[test]
    fn zero_margin_emits_ground_strips() {
        let mut spec = reference_spec();
        spec.ground.size_margin = 0.0;
        let result = SynthesizeScene::new(&spec).execute().unwrap();
        assert!(result.groups.contains("ground_left_strip"));
        assert!(result.groups.contains("ground_right_strip"));
        assert!(!result.groups.contains("ground_surface"));
    }

    #[test]
    fn noise_pass_is_deterministic_end_to_end() {
        let mut spec = reference_spec();
        spec.noise.enable = true;
        spec.noise.amplitude = 0.03;
        let a = SynthesizeScene::new(&spec).execute().unwrap();
        let b = SynthesizeScene::new(&spec).execute().unwrap();
        let walls_a = a.groups.get("trench_walls").unwrap();
        let walls_b = b.groups.get("trench_walls").unwrap();
        for (va, vb) in walls_a.vertices.iter().zip(&walls_b.vertices) {
            assert_eq!(va.x.to_bits(), vb.x.to_bits());
            assert_eq!(va.y.to_bits(), vb.y.to_bits());
            assert_eq!(va.z.to_bits(), vb.z.to_bits());
        }
    }

    #[test]
    fn invalid_spec_fails_before_geometry() {
        let mut spec = reference_spec();
        spec.width = -1.0;
        assert!(SynthesizeScene::new(&spec).execute().is_err());
    }

    struct StubRenderer;

    impl PreviewRenderer for StubRenderer {
        fn render(&self, _groups: &GroupSet, views: &[ViewAngle]) -> Vec<(String, Vec<u8>)> {
            views
                .iter()
                .map(|v| (v.name.clone(), vec![0u8, 1, 2]))
                .collect()
        }
    }

    #[test]
    fn renderer_capability_produces_named_previews() {
        let spec = reference_spec();
        let renderer = StubRenderer;
        let result = SynthesizeScene::new(&spec)
            .with_renderer(&renderer)
            .execute()
            .unwrap();
        let names: Vec<&str> = result.previews.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["top", "side", "oblique"]);
        assert!(result.previews.iter().all(|(_, bytes)| !bytes.is_empty()));
    }

    #[test]
    fn no_renderer_means_no_previews() {
        let spec = reference_spec();
        let result = SynthesizeScene::new(&spec).execute().unwrap();
        assert!(result.previews.is_empty());
    }

    #[test]
    fn every_group_has_in_bounds_indices() {
        let mut spec = reference_spec();
        spec.pipes.push(PipeSpec {
            n_theta: 16,
            n_along: 4,
            ..PipeSpec::default()
        });
        spec.boxes.push(BoxSpec::default());
        spec.spheres.push(SphereSpec {
            radius: 0.1,
            ..SphereSpec::default()
        });
        spec.noise.enable = true;
        let result = SynthesizeScene::new(&spec).execute().unwrap();
        for (name, mesh) in result.groups.iter() {
            assert!(mesh.indices_in_bounds(), "group {name} breaks index bounds");
            assert!(!mesh.is_empty(), "group {name} is empty");
        }
    }

    #[test]
    fn sloped_ground_keeps_volume_methods_in_agreement() {
        let mut spec = reference_spec();
        spec.ground.z0 = 1.5;
        spec.ground.slope_x = 0.2;
        spec.ground.slope_y = -0.05;
        spec.path_xy = vec![p(0.0, 0.0), p(2.0, 0.0), p(2.0, 2.0)];
        let result = SynthesizeScene::new(&spec).execute().unwrap();
        assert!(!result.metrics.volume_mismatch);
        assert!(result.metrics.volume_from_surface < 0.0);
    }
}
