mod ground;

pub use ground::{GroundModel, GroundPlane};

use crate::error::{Result, SceneError};
use crate::math::{Point2, TOLERANCE};

/// A buried pipe request: a capped cylinder along the trench.
#[derive(Debug, Clone)]
pub struct PipeSpec {
    /// Pipe radius.
    pub radius: f64,
    /// Pipe length along its axis.
    pub length: f64,
    /// Axis rotation from the local tangent, in degrees (plan view).
    pub angle_deg: f64,
    /// Fractional arc-length position of the pipe center.
    pub s_center: f64,
    /// Requested center elevation; `None` defaults to trench mid-depth.
    pub z: Option<f64>,
    /// Requested lateral offset from the centerline.
    pub offset_u: f64,
    /// Circumferential tessellation resolution.
    pub n_theta: usize,
    /// Axial tessellation resolution.
    pub n_along: usize,
    /// Scale applied to the meshing clearance reported downstream.
    pub clearance_scale: f64,
}

impl Default for PipeSpec {
    fn default() -> Self {
        Self {
            radius: 0.1,
            length: 1.0,
            angle_deg: 0.0,
            s_center: 0.5,
            z: None,
            offset_u: 0.0,
            n_theta: 96,
            n_along: 48,
            clearance_scale: 1.0,
        }
    }
}

/// A buried box request, aligned to the local trench frame.
#[derive(Debug, Clone)]
pub struct BoxSpec {
    /// Extent along the trench tangent.
    pub along: f64,
    /// Extent across the trench.
    pub across: f64,
    /// Vertical extent.
    pub height: f64,
    /// Fractional arc-length position.
    pub s: f64,
    /// Requested lateral offset from the centerline.
    pub offset_u: f64,
    /// Requested center elevation; `None` rests the box on the floor.
    pub z: Option<f64>,
}

impl Default for BoxSpec {
    fn default() -> Self {
        Self {
            along: 0.4,
            across: 0.3,
            height: 0.3,
            s: 0.5,
            offset_u: 0.0,
            z: None,
        }
    }
}

/// A buried sphere request.
#[derive(Debug, Clone)]
pub struct SphereSpec {
    /// Sphere radius.
    pub radius: f64,
    /// Fractional arc-length position.
    pub s: f64,
    /// Requested lateral offset from the centerline.
    pub offset_u: f64,
    /// Requested center elevation; `None` defaults to trench mid-depth.
    pub z: Option<f64>,
}

impl Default for SphereSpec {
    fn default() -> Self {
        Self {
            radius: 0.15,
            s: 0.7,
            offset_u: 0.0,
            z: None,
        }
    }
}

/// Procedural surface-noise parameters.
#[derive(Debug, Clone)]
pub struct NoiseSpec {
    /// Whether the noise pass runs at all.
    pub enable: bool,
    /// Displacement amplitude along vertex normals.
    pub amplitude: f64,
    /// Correlation length of the noise field.
    pub corr_length: f64,
    /// Number of octaves.
    pub octaves: u32,
    /// Per-octave amplitude decay.
    pub gain: f64,
    /// Seed for the wave-direction/phase sampling.
    pub seed: u64,
    /// Wildcard patterns selecting the groups to displace.
    pub apply_to: Vec<String>,
}

impl Default for NoiseSpec {
    fn default() -> Self {
        Self {
            enable: false,
            amplitude: 0.02,
            corr_length: 0.5,
            octaves: 2,
            gain: 0.5,
            seed: 42,
            apply_to: vec!["trench_walls".to_owned(), "trench_bottom".to_owned()],
        }
    }
}

/// Ground plane parameters plus the surrounding-surface margin.
#[derive(Debug, Clone, Copy)]
pub struct GroundSpec {
    /// Elevation at the origin.
    pub z0: f64,
    /// dz/dx.
    pub slope_x: f64,
    /// dz/dy.
    pub slope_y: f64,
    /// Margin of the rectangular ground surface around the trench
    /// footprint. Non-positive selects ribbon strips instead.
    pub size_margin: f64,
}

impl Default for GroundSpec {
    fn default() -> Self {
        Self {
            z0: 0.0,
            slope_x: 0.0,
            slope_y: 0.0,
            size_margin: 3.0,
        }
    }
}

impl GroundSpec {
    /// The affine ground model described by this spec.
    #[must_use]
    pub fn plane(&self) -> GroundPlane {
        GroundPlane::new(self.z0, self.slope_x, self.slope_y)
    }
}

/// Full input to a single synthesis run. Immutable once validated.
#[derive(Debug, Clone)]
pub struct SceneSpec {
    /// Trench centerline in plan view.
    pub path_xy: Vec<Point2>,
    /// Top opening width.
    pub width: f64,
    /// Trench depth below grade.
    pub depth: f64,
    /// Horizontal wall run per unit depth, each side.
    pub wall_slope: f64,
    /// Ground plane and surface margin.
    pub ground: GroundSpec,
    /// Buried pipe requests.
    pub pipes: Vec<PipeSpec>,
    /// Buried box requests.
    pub boxes: Vec<BoxSpec>,
    /// Buried sphere requests.
    pub spheres: Vec<SphereSpec>,
    /// Surface noise parameters.
    pub noise: NoiseSpec,
}

impl SceneSpec {
    /// Creates a spec with the given trench envelope and no primitives.
    #[must_use]
    pub fn new(path_xy: Vec<Point2>, width: f64, depth: f64) -> Self {
        Self {
            path_xy,
            width,
            depth,
            wall_slope: 0.0,
            ground: GroundSpec::default(),
            pipes: Vec::new(),
            boxes: Vec::new(),
            spheres: Vec::new(),
            noise: NoiseSpec::default(),
        }
    }

    /// Validates the specification before any geometry work begins.
    ///
    /// # Errors
    ///
    /// Returns a [`SceneError`] for a centerline with fewer than 2 points
    /// or coincident consecutive points, and for any non-finite numeric
    /// field; `width` and `depth` must be positive, `wall_slope`
    /// non-negative.
    pub fn validate(&self) -> Result<()> {
        if self.path_xy.len() < 2 {
            return Err(SceneError::CenterlineTooShort(self.path_xy.len()).into());
        }
        for (i, p) in self.path_xy.iter().enumerate() {
            finite("centerline x", p.x)?;
            finite("centerline y", p.y)?;
            if i > 0 && (p - self.path_xy[i - 1]).norm() < TOLERANCE {
                return Err(SceneError::CoincidentCenterlinePoints {
                    first: i - 1,
                    second: i,
                }
                .into());
            }
        }

        positive("width", self.width)?;
        positive("depth", self.depth)?;
        non_negative("wall_slope", self.wall_slope)?;

        finite("ground z0", self.ground.z0)?;
        finite("ground slope_x", self.ground.slope_x)?;
        finite("ground slope_y", self.ground.slope_y)?;
        finite("ground size_margin", self.ground.size_margin)?;

        for p in &self.pipes {
            positive("pipe radius", p.radius)?;
            positive("pipe length", p.length)?;
            finite("pipe angle_deg", p.angle_deg)?;
            finite("pipe s_center", p.s_center)?;
            finite("pipe offset_u", p.offset_u)?;
            non_negative("pipe clearance_scale", p.clearance_scale)?;
            if let Some(z) = p.z {
                finite("pipe z", z)?;
            }
        }
        for b in &self.boxes {
            positive("box along", b.along)?;
            positive("box across", b.across)?;
            positive("box height", b.height)?;
            finite("box s", b.s)?;
            finite("box offset_u", b.offset_u)?;
            if let Some(z) = b.z {
                finite("box z", z)?;
            }
        }
        for s in &self.spheres {
            positive("sphere radius", s.radius)?;
            finite("sphere s", s.s)?;
            finite("sphere offset_u", s.offset_u)?;
            if let Some(z) = s.z {
                finite("sphere z", z)?;
            }
        }

        finite("noise amplitude", self.noise.amplitude)?;
        finite("noise corr_length", self.noise.corr_length)?;
        finite("noise gain", self.noise.gain)?;

        Ok(())
    }
}

fn finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SceneError::NonFinite { field, value }.into())
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(SceneError::NonPositive { field, value }.into())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(SceneError::Negative { field, value }.into())
    }
}
