use serde::{Deserialize, Serialize};

use crate::env_ids::EnvIds;
use crate::error::{require_positive, require_range, ConfigError};
use crate::rng::EnvRngs;
use crate::Vec3f;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassSpec {
    #[serde(default)]
    pub enabled: bool,
    /// kg, used for every environment when disabled.
    pub base_mass: f32,
    #[serde(default)]
    pub min_mass: f32,
    #[serde(default)]
    pub max_mass: f32,
    /// Largest planar centre-of-mass shift (m).
    #[serde(default)]
    pub max_com_displacement: f32,
}

impl MassSpec {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        require_positive("disturbances.mass.base_mass", self.base_mass)?;
        if self.enabled {
            require_positive("disturbances.mass.min_mass", self.min_mass)?;
            require_range("disturbances.mass", self.min_mass, self.max_mass)?;
        }
        if !(self.max_com_displacement.is_finite() && self.max_com_displacement >= 0.0) {
            return Err(ConfigError::invalid(
                "disturbances.mass.max_com_displacement",
                "must be >= 0",
            ));
        }
        Ok(())
    }
}

/// Per-environment hull mass and centre-of-mass offset.
#[derive(Debug, Clone)]
pub struct MassDistribution {
    spec: MassSpec,
    masses: Vec<f32>,
    com: Vec<Vec3f>,
}

impl MassDistribution {
    pub fn new(spec: MassSpec, num_envs: usize) -> Result<Self, ConfigError> {
        spec.validate()?;
        Ok(Self {
            spec,
            masses: vec![spec.base_mass; num_envs],
            com: vec![Vec3f::ZERO; num_envs],
        })
    }

    pub fn randomize(&mut self, ids: &EnvIds, rngs: &mut EnvRngs) {
        for id in ids.iter() {
            if self.spec.enabled {
                self.masses[id] = rngs.uniform(id, self.spec.min_mass, self.spec.max_mass);
                let r = rngs.uniform(id, 0.0, self.spec.max_com_displacement);
                let theta = rngs.angle(id);
                self.com[id] = Vec3f::new(theta.cos() * r, theta.sin() * r, 0.0);
            } else {
                self.masses[id] = self.spec.base_mass;
                self.com[id] = Vec3f::ZERO;
            }
        }
    }

    pub fn masses(&self) -> &[f32] {
        &self.masses
    }

    /// Body-frame offsets from the geometric centre.
    pub fn com_offsets(&self) -> &[Vec3f] {
        &self.com
    }
}
