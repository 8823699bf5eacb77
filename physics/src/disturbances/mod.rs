//! Randomized external loads and sensor/actuator noise.
//!
//! Every load disturbance goes through one [`Disturbance`] engine; what
//! differs between "uneven floor" forces and torque kicks is only the
//! [`DisturbanceKind`] and the [`Dimensionality`] it is built with.

mod mass;
mod noise;

pub use mass::{MassDistribution, MassSpec};
pub use noise::{ActionNoise, ActionNoiseSpec, ObservationNoise, ObservationNoiseSpec};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::env_ids::EnvIds;
use crate::error::{require_range, ConfigError};
use crate::rng::EnvRngs;
use crate::Vec3f;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisturbancesSpec {
    #[serde(default)]
    pub dimensionality: Dimensionality,
    #[serde(default)]
    pub forces: DisturbanceSpec,
    #[serde(default)]
    pub torques: DisturbanceSpec,
    #[serde(default)]
    pub observations: ObservationNoiseSpec,
    #[serde(default)]
    pub actions: ActionNoiseSpec,
    pub mass: MassSpec,
}

impl DisturbancesSpec {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.forces.validate("disturbances.forces")?;
        self.torques.validate("disturbances.torques")?;
        self.observations.validate()?;
        self.actions.validate()?;
        self.mass.validate()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimensionality {
    /// Forces in the xy plane, torques about z.
    #[default]
    Planar,
    Spatial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisturbanceKind {
    Force,
    Torque,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisturbanceSpec {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub min_magnitude: f32,
    #[serde(default)]
    pub max_magnitude: f32,
    /// When set the load varies with position instead of being constant.
    #[serde(default)]
    pub sinusoid: Option<SinusoidSpec>,
}

impl DisturbanceSpec {
    fn validate(&self, key: &'static str) -> Result<(), ConfigError> {
        require_range(key, self.min_magnitude, self.max_magnitude)?;
        if self.min_magnitude < 0.0 {
            return Err(ConfigError::invalid(key, "magnitudes must be >= 0"));
        }
        if let Some(s) = &self.sinusoid {
            require_range(key, s.min_freq, s.max_freq)?;
            require_range(key, s.min_offset, s.max_offset)?;
        }
        Ok(())
    }
}

/// Per-axis `sin(position * freq + offset)` field, frequency and phase drawn
/// at reset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SinusoidSpec {
    pub min_freq: f32,
    pub max_freq: f32,
    pub min_offset: f32,
    pub max_offset: f32,
}

/// Batched force or torque disturbance.
#[derive(Debug, Clone)]
pub struct Disturbance {
    kind: DisturbanceKind,
    dim: Dimensionality,
    enabled: bool,
    min: f32,
    max: f32,
    sinusoid: Option<SinusoidSpec>,
    values: Vec<Vec3f>,
    freq: Vec<Vec3f>,
    offset: Vec<Vec3f>,
    out: Vec<Vec3f>,
}

impl Disturbance {
    pub fn new(
        spec: &DisturbanceSpec,
        kind: DisturbanceKind,
        dim: Dimensionality,
        num_envs: usize,
    ) -> Result<Self, ConfigError> {
        let key = match kind {
            DisturbanceKind::Force => "disturbances.forces",
            DisturbanceKind::Torque => "disturbances.torques",
        };
        spec.validate(key)?;
        // Planar magnitudes are given for one or two axes; spread them over
        // three so the spatial variant has comparable per-axis strength.
        let (min, max) = match dim {
            Dimensionality::Planar => (spec.min_magnitude, spec.max_magnitude),
            Dimensionality::Spatial => (
                (spec.min_magnitude.powi(2) / 3.0).sqrt(),
                (spec.max_magnitude.powi(2) / 3.0).sqrt(),
            ),
        };
        Ok(Self {
            kind,
            dim,
            enabled: spec.enabled,
            min,
            max,
            sinusoid: spec.sinusoid,
            values: vec![Vec3f::ZERO; num_envs],
            freq: vec![Vec3f::ZERO; num_envs],
            offset: vec![Vec3f::ZERO; num_envs],
            out: vec![Vec3f::ZERO; num_envs],
        })
    }

    pub fn kind(&self) -> DisturbanceKind {
        self.kind
    }

    /// Effective magnitude bounds after the spatial rescale.
    pub fn magnitude_range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    /// Constant per-environment vectors drawn by the last `generate`.
    pub fn values(&self) -> &[Vec3f] {
        &self.values
    }

    /// Resample the disturbance of the environments being reset.
    pub fn generate(&mut self, ids: &EnvIds, rngs: &mut EnvRngs) {
        if !self.enabled {
            return;
        }
        for id in ids.iter() {
            if let Some(s) = self.sinusoid {
                self.freq[id] = Vec3f::new(
                    rngs.uniform(id, s.min_freq, s.max_freq),
                    rngs.uniform(id, s.min_freq, s.max_freq),
                    rngs.uniform(id, s.min_freq, s.max_freq),
                );
                self.offset[id] = Vec3f::new(
                    rngs.uniform(id, s.min_offset, s.max_offset),
                    rngs.uniform(id, s.min_offset, s.max_offset),
                    rngs.uniform(id, s.min_offset, s.max_offset),
                );
                continue;
            }
            let r = rngs.uniform(id, self.min, self.max);
            self.values[id] = match (self.kind, self.dim) {
                (DisturbanceKind::Force, Dimensionality::Planar) => {
                    let theta = rngs.angle(id);
                    Vec3f::new(theta.cos() * r, theta.sin() * r, 0.0)
                }
                (DisturbanceKind::Torque, Dimensionality::Planar) => {
                    Vec3f::new(0.0, 0.0, r * rngs.sign(id))
                }
                (_, Dimensionality::Spatial) => {
                    // cos φ ~ U(-1, 1) keeps the direction uniform on the sphere.
                    let theta = rngs.angle(id);
                    let cos_phi = rngs.symmetric(id, 1.0);
                    let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
                    Vec3f::new(sin_phi * theta.cos(), sin_phi * theta.sin(), cos_phi) * r
                }
            };
        }
        debug!(kind = ?self.kind, envs = ids.len(), "resampled disturbance");
    }

    /// Disturbance to apply this step at the given world positions.
    pub fn get(&mut self, positions: &[Vec3f]) -> &[Vec3f] {
        debug_assert_eq!(positions.len(), self.out.len());
        if !self.enabled {
            return &self.out;
        }
        if self.sinusoid.is_none() {
            self.out.copy_from_slice(&self.values);
            return &self.out;
        }
        for (i, p) in positions.iter().enumerate() {
            let (f, o) = (self.freq[i], self.offset[i]);
            let wave = |pos: f32, freq: f32, off: f32| (pos * freq + off).sin() * self.max;
            self.out[i] = match (self.kind, self.dim) {
                (DisturbanceKind::Force, Dimensionality::Planar) => {
                    Vec3f::new(wave(p.x, f.x, o.x), wave(p.y, f.y, o.y), 0.0)
                }
                // A planar torque varies along x only.
                (DisturbanceKind::Torque, Dimensionality::Planar) => {
                    Vec3f::new(0.0, 0.0, wave(p.x, f.z, o.z))
                }
                (_, Dimensionality::Spatial) => Vec3f::new(
                    wave(p.x, f.x, o.x),
                    wave(p.y, f.y, o.y),
                    wave(p.z, f.z, o.z),
                ),
            };
        }
        &self.out
    }
}
