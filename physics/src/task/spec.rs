use serde::{Deserialize, Serialize};

use crate::error::{require_positive, require_range, ConfigError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    pub goal: TaskGoalSpec,
    /// Distance (m) beyond which an environment is killed.
    pub kill_dist: f32,
    pub kill_after_n_steps_in_tolerance: u32,
    #[serde(default)]
    pub observation_frame: ObservationFrame,
    pub spawn: SpawnSpec,
    pub reward: RewardSpec,
    #[serde(default)]
    pub penalties: PenaltiesSpec,
}

impl TaskSpec {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("task.kill_dist", self.kill_dist)?;
        self.goal.validate()?;
        self.spawn.validate()?;
        self.reward.validate()?;
        self.penalties.validate()
    }
}

/// Task variant, selected by the `name` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum TaskGoalSpec {
    GoToXy {
        position_tolerance: f32,
        #[serde(default)]
        goal_random_position: f32,
    },
    GoToPose {
        position_tolerance: f32,
        heading_tolerance: f32,
        #[serde(default)]
        goal_random_position: f32,
    },
    TrackXyVelocity {
        lin_vel_tolerance: f32,
        goal_random_linear_velocity: f32,
    },
    TrackXyoVelocity {
        lin_vel_tolerance: f32,
        ang_vel_tolerance: f32,
        goal_random_linear_velocity: f32,
        goal_random_angular_velocity: f32,
    },
}

impl TaskGoalSpec {
    /// Value written into the observation so a shared policy can tell tasks
    /// apart.
    pub fn label(&self) -> f32 {
        match self {
            Self::GoToXy { .. } => 0.0,
            Self::GoToPose { .. } => 1.0,
            Self::TrackXyVelocity { .. } => 2.0,
            Self::TrackXyoVelocity { .. } => 3.0,
        }
    }

    /// Position tasks measure the kill distance to the goal; velocity tasks
    /// measure it to the environment origin.
    pub fn is_position_task(&self) -> bool {
        matches!(self, Self::GoToXy { .. } | Self::GoToPose { .. })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let (tolerances, ranges) = match *self {
            Self::GoToXy {
                position_tolerance,
                goal_random_position,
            } => (vec![position_tolerance], vec![goal_random_position]),
            Self::GoToPose {
                position_tolerance,
                heading_tolerance,
                goal_random_position,
            } => (
                vec![position_tolerance, heading_tolerance],
                vec![goal_random_position],
            ),
            Self::TrackXyVelocity {
                lin_vel_tolerance,
                goal_random_linear_velocity,
            } => (vec![lin_vel_tolerance], vec![goal_random_linear_velocity]),
            Self::TrackXyoVelocity {
                lin_vel_tolerance,
                ang_vel_tolerance,
                goal_random_linear_velocity,
                goal_random_angular_velocity,
            } => (
                vec![lin_vel_tolerance, ang_vel_tolerance],
                vec![goal_random_linear_velocity, goal_random_angular_velocity],
            ),
        };
        for t in tolerances {
            require_positive("task.goal.tolerance", t)?;
        }
        if ranges.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(ConfigError::invalid("task.goal", "random goal ranges must be >= 0"));
        }
        Ok(())
    }
}

/// Frame the velocity and task errors are expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationFrame {
    #[default]
    Global,
    /// Rotated by the vessel heading.
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnSpec {
    #[serde(default)]
    pub min_distance: f32,
    #[serde(default)]
    pub max_distance: f32,
    /// Steps over which the spawn distance grows from min to max. Unset means
    /// the full range from the first episode.
    #[serde(default)]
    pub curriculum_steps: Option<f32>,
    #[serde(default)]
    pub max_spawn_speed: f32,
}

impl SpawnSpec {
    fn validate(&self) -> Result<(), ConfigError> {
        require_range("task.spawn", self.min_distance, self.max_distance)?;
        if self.min_distance < 0.0 || self.max_spawn_speed < 0.0 {
            return Err(ConfigError::invalid("task.spawn", "distances and speed must be >= 0"));
        }
        check_curriculum("task.spawn.curriculum_steps", self.curriculum_steps)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardMode {
    /// `1 / (1 + d)`
    Linear,
    /// `1 / (1 + d^2)`
    Square,
    /// `exp(-d / coeff)`
    #[default]
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardSpec {
    #[serde(default)]
    pub mode: RewardMode,
    #[serde(default = "default_exponential_coeff")]
    pub exponential_reward_coeff: f32,
    /// Weight of the heading term (GoToPose).
    #[serde(default = "one")]
    pub heading_weight: f32,
    /// Weight of the angular velocity term (TrackXYOVelocity).
    #[serde(default = "one")]
    pub angular_velocity_weight: f32,
}

fn default_exponential_coeff() -> f32 {
    0.25
}

fn one() -> f32 {
    1.0
}

impl RewardSpec {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.mode == RewardMode::Exponential {
            require_positive("task.reward.exponential_reward_coeff", self.exponential_reward_coeff)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PenaltiesSpec {
    #[serde(default)]
    pub linear_velocity_weight: f32,
    #[serde(default)]
    pub angular_velocity_weight: f32,
    #[serde(default)]
    pub action_weight: f32,
    #[serde(default)]
    pub curriculum_steps: Option<f32>,
}

impl PenaltiesSpec {
    fn validate(&self) -> Result<(), ConfigError> {
        let w = [
            self.linear_velocity_weight,
            self.angular_velocity_weight,
            self.action_weight,
        ];
        if w.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::invalid("task.penalties", "weights must be >= 0"));
        }
        check_curriculum("task.penalties.curriculum_steps", self.curriculum_steps)
    }
}

fn check_curriculum(key: &'static str, steps: Option<f32>) -> Result<(), ConfigError> {
    match steps {
        Some(s) => require_positive(key, s),
        None => Ok(()),
    }
}

/// Linear curriculum weight in `[0, 1]`.
pub fn curriculum_ramp(step: u64, curriculum_steps: Option<f32>) -> f32 {
    match curriculum_steps {
        Some(n) => (step as f32 / n).min(1.0),
        None => 1.0,
    }
}
