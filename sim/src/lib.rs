use anyhow::Result;
use bevy::prelude::*;
use tracing::info;
use uuid::Uuid;

pub mod args;
pub mod body;
pub mod config;
pub mod policy;
pub mod resources;
pub mod systems;

pub use args::Args;
pub use config::{load_config, Config, EnvConfig};
pub use policy::{Policy, PolicyKind};
pub use resources::{EpisodeBuffers, Fleet, Recorder, SimSettings, TaskState};

use body::Bodies;
use physics::disturbances::{ActionNoise, MassDistribution, ObservationNoise};
use physics::{
    Disturbance, DisturbanceKind, EnvRngs, Hydrodynamics, Hydrostatics, Task, Thrusters,
};
use resources::{EnvDisturbances, Rngs, VesselModels};
use systems::StepSet;
use telemetry::{EpisodeLog, RunHeader};

/// Knobs that come from the command line rather than the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub policy: PolicyKind,
    pub record: bool,
}

impl From<&Args> for RunOptions {
    fn from(args: &Args) -> Self {
        Self {
            policy: args.policy,
            record: args.record.is_some(),
        }
    }
}

/// Build the headless app. Every model is constructed and validated here, so
/// a bad config fails before the first step.
pub fn build_sim_app(cfg: Config, opts: RunOptions) -> Result<App> {
    cfg.validate()?;
    let n = cfg.env.num_envs;
    let mut rngs = EnvRngs::new(n, cfg.env.seed);

    let dyn_spec = &cfg.dynamics;
    let hydrostatics = Hydrostatics::new(&dyn_spec.hydrostatics, n)?;
    let hydrodynamics =
        Hydrodynamics::new(&dyn_spec.hydrodynamics, &dyn_spec.water_current, n, &mut rngs)?;
    let thrusters = Thrusters::new(&dyn_spec.thrusters, cfg.env.dt, n, &mut rngs)?;

    let d = &cfg.disturbances;
    let disturbances = EnvDisturbances {
        forces: Disturbance::new(&d.forces, DisturbanceKind::Force, d.dimensionality, n)?,
        torques: Disturbance::new(&d.torques, DisturbanceKind::Torque, d.dimensionality, n)?,
        observation_noise: ObservationNoise::new(d.observations)?,
        action_noise: ActionNoise::new(d.actions)?,
        mass: MassDistribution::new(d.mass, n)?,
    };
    let task = Task::new(cfg.task.clone(), n)?;
    let bodies = Bodies::new(
        n,
        dyn_spec.hydrostatics.mass,
        dyn_spec.hydrostatics.gravity,
        *hydrostatics.hull(),
    );

    let settings = SimSettings {
        num_envs: n,
        dt: cfg.env.dt,
        max_episode_length: cfg.env.max_episode_length,
        action_mode: cfg.env.action_mode,
        record_env: cfg.env.record_env,
        run_id: Uuid::new_v4(),
    };
    let recorder = opts.record.then(|| {
        let mut header = RunHeader::new(
            n as u32,
            cfg.env.dt,
            cfg.env.seed,
            cfg.task_name(),
            cfg.env.record_env as u32,
        );
        header.run_id = settings.run_id;
        EpisodeLog::new(header)
    });
    info!(
        run_id = %settings.run_id,
        num_envs = n,
        dt = cfg.env.dt,
        seed = cfg.env.seed,
        task = cfg.task_name(),
        policy = ?opts.policy,
        "sim app built"
    );

    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(settings)
        .insert_resource(Fleet(bodies))
        .insert_resource(VesselModels {
            hydrostatics,
            hydrodynamics,
            thrusters,
        })
        .insert_resource(disturbances)
        .insert_resource(TaskState(task))
        .insert_resource(Policy::new(opts.policy, &cfg.task, cfg.env.seed))
        .insert_resource(Rngs(rngs))
        .insert_resource(EpisodeBuffers::new(n))
        .insert_resource(Recorder(recorder))
        .insert_resource(cfg)
        .add_systems(
            Update,
            (
                systems::reset_done_envs,
                systems::pre_physics_step,
                systems::apply_forces,
                systems::integrate_bodies,
                systems::update_state,
                systems::calculate_metrics,
                systems::is_done,
                systems::record_step,
            )
                .chain()
                .in_set(StepSet),
        );
    Ok(app)
}

/// Run `steps` physics steps.
pub fn run_steps(app: &mut App, steps: u64) {
    for _ in 0..steps {
        app.update();
    }
}

/// Take the recorded log out of the app, leaving recording off.
pub fn take_recording(app: &mut App) -> Option<EpisodeLog> {
    app.world_mut()
        .get_resource_mut::<Recorder>()
        .and_then(|mut r| r.0.take())
}
