use bevy::prelude::Resource;
use uuid::Uuid;

use physics::disturbances::{ActionNoise, MassDistribution, ObservationNoise};
use physics::task::EpisodeSummary;
use physics::{
    ActionMode, Disturbance, EnvRngs, Hydrodynamics, Hydrostatics, Observation, Task, Thrusters,
    Vec3f, Wrench,
};
use telemetry::EpisodeLog;

use crate::body::Bodies;

#[derive(Resource, Debug, Clone, Copy)]
pub struct SimSettings {
    pub num_envs: usize,
    pub dt: f32,
    pub max_episode_length: u32,
    pub action_mode: ActionMode,
    pub record_env: usize,
    pub run_id: Uuid,
}

#[derive(Resource, Debug)]
pub struct Fleet(pub Bodies);

#[derive(Resource, Debug)]
pub struct VesselModels {
    pub hydrostatics: Hydrostatics,
    pub hydrodynamics: Hydrodynamics,
    pub thrusters: Thrusters,
}

#[derive(Resource, Debug)]
pub struct EnvDisturbances {
    pub forces: Disturbance,
    pub torques: Disturbance,
    pub observation_noise: ObservationNoise,
    pub action_noise: ActionNoise,
    pub mass: MassDistribution,
}

#[derive(Resource, Debug)]
pub struct TaskState(pub Task);

#[derive(Resource, Debug)]
pub struct Rngs(pub EnvRngs);

/// Per-step buffers shared by the pipeline systems.
#[derive(Resource, Debug)]
pub struct EpisodeBuffers {
    /// Global step counter driving the curricula.
    pub step: u64,
    pub progress: Vec<u32>,
    pub reset: Vec<bool>,
    /// Environments placed by this step's reset.
    pub just_reset: Vec<bool>,
    pub actions: Vec<[f32; 2]>,
    pub observations: Vec<Observation>,
    pub rewards: Vec<f32>,
    pub hull_wrench: Vec<Wrench>,
    pub world_force: Vec<Vec3f>,
    pub world_torque: Vec<Vec3f>,
    pub episodes_done: u64,
    pub last_summary: Option<EpisodeSummary>,
}

impl EpisodeBuffers {
    pub fn new(num_envs: usize) -> Self {
        Self {
            step: 0,
            progress: vec![0; num_envs],
            // Every environment starts with a reset.
            reset: vec![true; num_envs],
            just_reset: vec![false; num_envs],
            actions: vec![[0.0; 2]; num_envs],
            observations: vec![[0.0; physics::OBS_DIM]; num_envs],
            rewards: vec![0.0; num_envs],
            hull_wrench: vec![[0.0; 6]; num_envs],
            world_force: vec![Vec3f::ZERO; num_envs],
            world_torque: vec![Vec3f::ZERO; num_envs],
            episodes_done: 0,
            last_summary: None,
        }
    }
}

#[derive(Resource, Debug, Default)]
pub struct Recorder(pub Option<EpisodeLog>);
