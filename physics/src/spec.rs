use serde::{Deserialize, Serialize};

use crate::error::{require_positive, require_range, ConfigError};

/// Full dynamics description of one vessel class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselSpec {
    pub hydrostatics: HydrostaticsSpec,
    pub hydrodynamics: HydrodynamicsSpec,
    pub thrusters: ThrusterSpec,
    #[serde(default)]
    pub water_current: WaterCurrentSpec,
}

impl VesselSpec {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hydrostatics.validate()?;
        self.hydrodynamics.validate()?;
        self.thrusters.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydrostaticsSpec {
    /// kg/m^3
    pub water_density: f32,
    /// Signed vertical gravity component (simulator convention, e.g. -9.81).
    pub gravity: f32,
    /// Constant force magnitude used by the righting torque in place of the
    /// live buoyant force.
    pub average_hydrostatics_force_value: f32,
    pub amplify_torque: f32,
    /// Hull box dimensions (m).
    pub box_width: f32,
    pub box_length: f32,
    /// m^2
    pub waterplane_area: f32,
    /// Body height at which the hull starts to submerge (m).
    pub zero_height: f32,
    /// Extra submersion depth allowed below `zero_height` (m).
    #[serde(default = "default_max_draft")]
    pub max_draft: f32,
    /// Nominal hull mass (kg), used for the floating equilibrium height.
    pub mass: f32,
    /// Defaults to half the box width.
    #[serde(default)]
    pub metacentric_width: Option<f32>,
    /// Defaults to half the box length.
    #[serde(default)]
    pub metacentric_length: Option<f32>,
    /// When false the global righting torque is reported as the body torque
    /// unchanged; downstream tuning relies on that.
    #[serde(default)]
    pub rotate_torque_to_body: bool,
}

fn default_max_draft() -> f32 {
    20.0
}

impl HydrostaticsSpec {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("hydrostatics.water_density", self.water_density)?;
        require_positive("hydrostatics.box_width", self.box_width)?;
        require_positive("hydrostatics.box_length", self.box_length)?;
        require_positive("hydrostatics.waterplane_area", self.waterplane_area)?;
        require_positive("hydrostatics.mass", self.mass)?;
        if !self.gravity.is_finite() {
            return Err(ConfigError::invalid("hydrostatics.gravity", "must be finite"));
        }
        if !(self.max_draft.is_finite() && self.max_draft >= 0.0) {
            return Err(ConfigError::invalid("hydrostatics.max_draft", "must be >= 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydrodynamicsSpec {
    /// Per-axis (u, v, w, p, q, r) linear damping.
    pub linear_damping: [f32; 6],
    /// Per-axis quadratic damping.
    pub quadratic_damping: [f32; 6],
    pub linear_damping_forward_speed: [f32; 6],
    pub offset_linear_damping: f32,
    pub offset_lin_forward_damping_speed: f32,
    pub offset_nonlin_damping: f32,
    pub scaling_damping: f32,
    #[serde(default)]
    pub randomization: DragRandomizationSpec,
}

impl HydrodynamicsSpec {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let all = self
            .linear_damping
            .iter()
            .chain(&self.quadratic_damping)
            .chain(&self.linear_damping_forward_speed);
        if all.into_iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::invalid("hydrodynamics", "damping coefficients must be finite"));
        }
        if !self.scaling_damping.is_finite() {
            return Err(ConfigError::invalid("hydrodynamics.scaling_damping", "must be finite"));
        }
        self.randomization.validate()
    }
}

/// Uniform perturbation of the damping coefficients. Each entry is a fraction
/// of the matching base coefficient.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DragRandomizationSpec {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub linear: [f32; 6],
    #[serde(default)]
    pub quadratic: [f32; 6],
}

impl DragRandomizationSpec {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.linear.iter().chain(&self.quadratic).any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::invalid(
                "hydrodynamics.randomization",
                "fractions must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaterCurrentSpec {
    #[serde(default)]
    pub enabled: bool,
    /// World-frame flow velocity (m/s), uniform over the whole pool.
    #[serde(default)]
    pub flow_velocity: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrusterSpec {
    /// First-order lag time constant (s).
    pub time_constant: f32,
    pub cmd_lower_range: f32,
    pub cmd_upper_range: f32,
    /// Commands inside `[deadband[0], deadband[1]]` produce no thrust.
    pub deadband: [f32; 2],
    pub interpolation: InterpolationSpec,
    pub least_squares: LeastSquaresSpec,
    /// Body-frame mounting points (m) of the left and right thruster. Both
    /// push along body +x.
    pub positions: [[f32; 3]; 2],
    /// Share the thrust budget across thrusters instead of giving each one
    /// the full calibrated force.
    #[serde(default)]
    pub split_thrust: bool,
    #[serde(default)]
    pub randomization: ThrusterRandomizationSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpolationSpec {
    /// Samples in the lookup table spanning the command range.
    pub points_for_interpolation: usize,
    /// `(command, thrust)` calibration points below the deadband.
    pub left: Vec<[f32; 2]>,
    /// `(command, thrust)` calibration points above the deadband.
    pub right: Vec<[f32; 2]>,
}

/// Polynomial fits used beyond the calibration data, highest degree first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeastSquaresSpec {
    pub neg_cmd_coeff: Vec<f32>,
    pub pos_cmd_coeff: Vec<f32>,
}

/// Multiplicative noise, as fractions, resampled per environment on reset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThrusterRandomizationSpec {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub left_gain: f32,
    #[serde(default)]
    pub right_gain: f32,
    #[serde(default)]
    pub time_constant: f32,
}

impl ThrusterSpec {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("thrusters.time_constant", self.time_constant)?;
        require_range("thrusters.cmd_range", self.cmd_lower_range, self.cmd_upper_range)?;
        require_range("thrusters.deadband", self.deadband[0], self.deadband[1])?;
        if self.deadband[0] < self.cmd_lower_range || self.deadband[1] > self.cmd_upper_range {
            return Err(ConfigError::invalid(
                "thrusters.deadband",
                "deadband must lie inside the command range",
            ));
        }
        if self.interpolation.points_for_interpolation < 2 {
            return Err(ConfigError::invalid(
                "thrusters.interpolation.points_for_interpolation",
                "need at least 2 samples",
            ));
        }
        if self.least_squares.neg_cmd_coeff.is_empty() {
            return Err(ConfigError::MissingKey("thrusters.least_squares.neg_cmd_coeff"));
        }
        if self.least_squares.pos_cmd_coeff.is_empty() {
            return Err(ConfigError::MissingKey("thrusters.least_squares.pos_cmd_coeff"));
        }
        check_calibration("thrusters.interpolation.left", &self.interpolation.left)?;
        check_calibration("thrusters.interpolation.right", &self.interpolation.right)?;
        if let Some(p) = self.interpolation.left.last() {
            if p[0] > self.deadband[0] {
                return Err(ConfigError::invalid(
                    "thrusters.interpolation.left",
                    "points must sit below the deadband",
                ));
            }
        }
        if let Some(p) = self.interpolation.right.first() {
            if p[0] < self.deadband[1] {
                return Err(ConfigError::invalid(
                    "thrusters.interpolation.right",
                    "points must sit above the deadband",
                ));
            }
        }
        let r = &self.randomization;
        if [r.left_gain, r.right_gain, r.time_constant]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0 || *v >= 1.0)
        {
            return Err(ConfigError::invalid(
                "thrusters.randomization",
                "fractions must be in [0, 1)",
            ));
        }
        Ok(())
    }
}

fn check_calibration(key: &'static str, points: &[[f32; 2]]) -> Result<(), ConfigError> {
    let ordered = points
        .windows(2)
        .all(|w| w[0][0] < w[1][0] && w[0][1] <= w[1][1]);
    if ordered && points.iter().flatten().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ConfigError::UnsortedCalibration(key))
    }
}
