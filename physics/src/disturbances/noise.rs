use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rng::EnvRngs;
use crate::vessel::PlanarState;

/// Amplitudes of the additive uniform noise on observed state. Zero disables
/// the matching term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationNoiseSpec {
    #[serde(default)]
    pub position: f32,
    /// Applied to linear velocity and yaw rate.
    #[serde(default)]
    pub velocity: f32,
    #[serde(default)]
    pub heading: f32,
}

impl ObservationNoiseSpec {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (key, v) in [
            ("disturbances.observations.position", self.position),
            ("disturbances.observations.velocity", self.velocity),
            ("disturbances.observations.heading", self.heading),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(ConfigError::invalid(key, "amplitude must be >= 0"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionNoiseSpec {
    #[serde(default)]
    pub amplitude: f32,
}

impl ActionNoiseSpec {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.amplitude.is_finite() && self.amplitude >= 0.0 {
            Ok(())
        } else {
            Err(ConfigError::invalid(
                "disturbances.actions.amplitude",
                "amplitude must be >= 0",
            ))
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ObservationNoise {
    spec: ObservationNoiseSpec,
}

impl ObservationNoise {
    pub fn new(spec: ObservationNoiseSpec) -> Result<Self, ConfigError> {
        spec.validate()?;
        Ok(Self { spec })
    }

    /// Perturb the observed states in place. The true state is untouched.
    pub fn apply(&self, states: &mut [PlanarState], rngs: &mut EnvRngs) {
        let s = self.spec;
        for (id, st) in states.iter_mut().enumerate() {
            if s.position > 0.0 {
                st.position.x += rngs.symmetric(id, s.position);
                st.position.y += rngs.symmetric(id, s.position);
            }
            if s.velocity > 0.0 {
                st.linear_velocity.x += rngs.symmetric(id, s.velocity);
                st.linear_velocity.y += rngs.symmetric(id, s.velocity);
                st.angular_velocity += rngs.symmetric(id, s.velocity);
            }
            if s.heading > 0.0 {
                st.heading += rngs.symmetric(id, s.heading);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ActionNoise {
    amplitude: f32,
}

impl ActionNoise {
    pub fn new(spec: ActionNoiseSpec) -> Result<Self, ConfigError> {
        spec.validate()?;
        Ok(Self {
            amplitude: spec.amplitude,
        })
    }

    pub fn apply<const K: usize>(&self, actions: &mut [[f32; K]], rngs: &mut EnvRngs) {
        if self.amplitude == 0.0 {
            return;
        }
        for (id, a) in actions.iter_mut().enumerate() {
            for v in a.iter_mut() {
                *v += rngs.symmetric(id, self.amplitude);
            }
        }
    }
}
