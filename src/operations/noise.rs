use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::math::{Point3, Vector3};
use crate::mesh::{vertex_normals, GroupSet, TriangleMesh};
use crate::scene::NoiseSpec;

/// Number of random wave directions per octave.
const WAVE_DIRECTIONS: usize = 7;

#[derive(Debug, Clone, Copy)]
struct Wave {
    k: Vector3,
    phase: f64,
    amplitude: f64,
}

/// A band-limited scalar noise field: a seeded sum of cosine waves with
/// octave-doubling frequency and geometrically decaying amplitude.
///
/// Deterministic for a given seed, which reproducible synthetic datasets
/// rely on.
#[derive(Debug, Clone)]
pub struct NoiseField {
    waves: Vec<Wave>,
}

impl NoiseField {
    /// Samples the wave set for a seed. The base wavenumber is
    /// `2*pi / corr_length`; octave `o` doubles it `o` times and decays
    /// by `gain^o`.
    #[must_use]
    pub fn new(seed: u64, corr_length: f64, octaves: u32, gain: f64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let base_k = TAU / corr_length.max(1e-6);
        let mut waves = Vec::with_capacity(octaves as usize * WAVE_DIRECTIONS);
        for octave in 0..octaves {
            #[allow(clippy::cast_possible_wrap)]
            let k_scale = 2.0_f64.powi(octave as i32) * base_k;
            #[allow(clippy::cast_possible_wrap, clippy::cast_precision_loss)]
            let amplitude = gain.powi(octave as i32) / WAVE_DIRECTIONS as f64;
            for _ in 0..WAVE_DIRECTIONS {
                let k = unit_direction(&mut rng) * k_scale;
                let phase = rng.gen_range(0.0..TAU);
                waves.push(Wave {
                    k,
                    phase,
                    amplitude,
                });
            }
        }
        Self { waves }
    }

    /// Field value at a point.
    #[must_use]
    pub fn sample(&self, p: &Point3) -> f64 {
        self.waves
            .iter()
            .map(|w| w.amplitude * (w.k.dot(&p.coords) + w.phase).cos())
            .sum()
    }
}

/// Uniform random unit vector on the sphere.
fn unit_direction(rng: &mut StdRng) -> Vector3 {
    let z: f64 = rng.gen_range(-1.0..=1.0);
    let azimuth: f64 = rng.gen_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vector3::new(r * azimuth.cos(), r * azimuth.sin(), z)
}

/// Displaces selected mesh groups along their vertex normals by a
/// seeded noise field.
///
/// Group names are matched against shell-style wildcard patterns;
/// unmatched groups pass through as copies, so the returned set never
/// aliases the input.
pub struct ApplyNoise {
    amplitude: f64,
    seed: u64,
    corr_length: f64,
    octaves: u32,
    gain: f64,
    patterns: Vec<String>,
}

impl ApplyNoise {
    /// Creates the noise pass from a scene noise spec.
    #[must_use]
    pub fn new(spec: &NoiseSpec) -> Self {
        Self {
            amplitude: spec.amplitude,
            seed: spec.seed,
            corr_length: spec.corr_length,
            octaves: spec.octaves,
            gain: spec.gain,
            patterns: spec.apply_to.clone(),
        }
    }

    /// Executes the pass, returning a fresh group set.
    #[must_use]
    pub fn execute(&self, groups: &GroupSet) -> GroupSet {
        let field = NoiseField::new(self.seed, self.corr_length, self.octaves, self.gain);
        groups
            .iter()
            .map(|(name, mesh)| {
                let mesh = if self.selects(name) {
                    self.displace(mesh, &field)
                } else {
                    mesh.clone()
                };
                (name.to_owned(), mesh)
            })
            .collect()
    }

    fn selects(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| glob_match(p, name))
    }

    fn displace(&self, mesh: &TriangleMesh, field: &NoiseField) -> TriangleMesh {
        let normals = vertex_normals(mesh);
        let vertices = mesh
            .vertices
            .iter()
            .zip(&normals)
            .map(|(v, n)| v + n * (self.amplitude * field.sample(v)))
            .collect();
        TriangleMesh::new(vertices, mesh.indices.clone())
    }
}

/// Shell-style wildcard match: `*` matches any run of characters, `?`
/// matches exactly one.
fn glob_match(pattern: &str, text: &str) -> bool {
    fn matches(p: &[char], t: &[char]) -> bool {
        match p.split_first() {
            None => t.is_empty(),
            Some(('*', rest)) => (0..=t.len()).any(|i| matches(rest, &t[i..])),
            Some(('?', rest)) => !t.is_empty() && matches(rest, &t[1..]),
            Some((&c, rest)) => t.first() == Some(&c) && matches(rest, &t[1..]),
        }
    }
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    matches(&p, &t)
}
