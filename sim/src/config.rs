use std::path::Path;

use anyhow::{Context, Result};
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use physics::builtins::{default_disturbances, go_to_pose_task, heron_spec};
use physics::{ActionMode, DisturbancesSpec, TaskSpec, VesselSpec};

#[derive(Debug, Clone, Serialize, Deserialize, Resource)]
pub struct Config {
    pub env: EnvConfig,
    pub dynamics: VesselSpec,
    pub disturbances: DisturbancesSpec,
    pub task: TaskSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvConfig {
    pub num_envs: usize,
    /// Physics step (s).
    pub dt: f32,
    /// Steps before an episode is cut regardless of the task.
    pub max_episode_length: u32,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub action_mode: ActionMode,
    /// Environment whose steps go into the recording.
    #[serde(default)]
    pub record_env: usize,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            num_envs: 16,
            dt: 1.0 / 50.0,
            max_episode_length: 2000,
            seed: 0,
            action_mode: ActionMode::Continuous,
            record_env: 0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env: EnvConfig::default(),
            dynamics: heron_spec(),
            disturbances: default_disturbances(),
            task: go_to_pose_task(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.env.num_envs > 0, "env.num_envs must be > 0");
        anyhow::ensure!(
            self.env.dt.is_finite() && self.env.dt > 0.0,
            "env.dt must be > 0, got {}",
            self.env.dt
        );
        anyhow::ensure!(self.env.max_episode_length > 0, "env.max_episode_length must be > 0");
        anyhow::ensure!(
            self.env.record_env < self.env.num_envs,
            "env.record_env {} out of range for {} envs",
            self.env.record_env,
            self.env.num_envs
        );
        self.dynamics.validate()?;
        self.disturbances.validate()?;
        self.task.validate()?;
        Ok(())
    }

    pub fn task_name(&self) -> &'static str {
        use physics::task::TaskGoalSpec::*;
        match self.task.goal {
            GoToXy { .. } => "go_to_xy",
            GoToPose { .. } => "go_to_pose",
            TrackXyVelocity { .. } => "track_xy_velocity",
            TrackXyoVelocity { .. } => "track_xyo_velocity",
        }
    }
}

/// Read a TOML config, or fall back to the builtin Heron setup.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let cfg = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("reading config {}", p.display()))?;
            toml::from_str::<Config>(&text)
                .with_context(|| format!("parsing config {}", p.display()))?
        }
        None => Config::default(),
    };
    cfg.validate()?;
    Ok(cfg)
}
