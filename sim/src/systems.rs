use bevy::prelude::*;
use tracing::{debug, warn};

use physics::{
    quat_to_wxyz, wrench_add, EnvIds, PlanarState, Quatf, VehicleState, Vec3f, NUM_THRUSTERS,
};
use telemetry::StepRecord;

use crate::policy::Policy;
use crate::resources::{
    EnvDisturbances, EpisodeBuffers, Fleet, Recorder, Rngs, SimSettings, TaskState, VesselModels,
};

/// Ordered per-step pipeline.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepSet;

/// Redraw goals, spawns and per-environment randomization for every env
/// flagged for reset, then put the hull back on the water.
pub fn reset_done_envs(
    settings: Res<SimSettings>,
    mut fleet: ResMut<Fleet>,
    models: ResMut<VesselModels>,
    dist: ResMut<EnvDisturbances>,
    mut task: ResMut<TaskState>,
    mut rngs: ResMut<Rngs>,
    buf: ResMut<EpisodeBuffers>,
) {
    let buf = buf.into_inner();
    buf.just_reset.copy_from_slice(&buf.reset);
    let ids = EnvIds::from_mask(&buf.reset);
    if ids.is_empty() {
        return;
    }
    let models = models.into_inner();
    let dist = dist.into_inner();
    let rngs = &mut rngs.0;
    let task = &mut task.0;

    if buf.step > 0 {
        let summary = task.flush_stats(&ids, settings.max_episode_length);
        buf.episodes_done += ids.len() as u64;
        debug!(
            step = buf.step,
            episodes = summary.episodes,
            reward = summary.reward,
            error = summary.primary_error,
            speed = summary.linear_speed,
            "episodes finished"
        );
        buf.last_summary = Some(summary);
    }

    task.reset(&ids);
    task.get_goals(&ids, rngs);
    let spawns = task.get_spawns(&ids, buf.step, rngs);
    dist.mass.randomize(&ids, rngs);
    dist.forces.generate(&ids, rngs);
    dist.torques.generate(&ids, rngs);
    models.hydrodynamics.reset_coefficients(&ids, rngs);
    models.thrusters.reset(&ids);
    models.thrusters.reset_thruster_randomization(&ids, rngs);

    let hull = *models.hydrostatics.hull();
    let density = models.hydrostatics.water_density();
    for (id, s) in spawns {
        let mass = dist.mass.masses()[id];
        fleet.0.set_mass(id, mass, dist.mass.com_offsets()[id]);
        fleet.0.set_state(
            id,
            VehicleState {
                position: s.position.extend(hull.equilibrium_height(mass, density)),
                orientation: Quatf::from_rotation_z(s.heading),
                linear_velocity: s.linear_velocity.extend(0.0),
                angular_velocity: Vec3f::new(0.0, 0.0, s.angular_velocity),
            },
        );
    }
    ids.fill(&mut buf.progress, 0);
    ids.fill(&mut buf.reset, false);
}

/// Observe, query the policy and hand the commands to the thrusters.
/// Environments reset this step get zero commands.
#[allow(clippy::too_many_arguments)]
pub fn pre_physics_step(
    settings: Res<SimSettings>,
    fleet: Res<Fleet>,
    dist: Res<EnvDisturbances>,
    mut task: ResMut<TaskState>,
    mut rngs: ResMut<Rngs>,
    mut policy: ResMut<Policy>,
    mut models: ResMut<VesselModels>,
    buf: ResMut<EpisodeBuffers>,
) {
    let buf = buf.into_inner();
    let mut observed: Vec<PlanarState> = fleet.0.states.iter().map(VehicleState::planar).collect();
    dist.observation_noise.apply(&mut observed, &mut rngs.0);
    buf.observations
        .copy_from_slice(task.0.get_state_observations(&observed));

    for (action, obs) in buf.actions.iter_mut().zip(&buf.observations) {
        *action = policy.act(obs, settings.action_mode);
    }

    let mut cmds: Vec<[f32; NUM_THRUSTERS]> = buf
        .actions
        .iter()
        .map(|a| settings.action_mode.to_command(*a))
        .collect();
    dist.action_noise.apply(&mut cmds, &mut rngs.0);
    // A hull placed this step starts without thrust.
    for (cmd, fresh) in cmds.iter_mut().zip(&buf.just_reset) {
        if *fresh {
            *cmd = [0.0; NUM_THRUSTERS];
        }
    }
    models.thrusters.set_target(&cmds);
}

/// Sum hydrostatics, damping and thrust into the hull wrench and sample the
/// external disturbances.
pub fn apply_forces(
    fleet: Res<Fleet>,
    models: ResMut<VesselModels>,
    mut dist: ResMut<EnvDisturbances>,
    mut buf: ResMut<EpisodeBuffers>,
) {
    let models = models.into_inner();
    let bodies = &fleet.0;
    let positions = bodies.positions();

    let statics = models.hydrostatics.update_from_states(&bodies.states);
    let drag = models
        .hydrodynamics
        .compute_hydrodynamics(&bodies.orientations(), &bodies.twists());
    let thrust = models.thrusters.step();

    for (i, out) in buf.hull_wrench.iter_mut().enumerate() {
        *out = wrench_add(wrench_add(statics[i], drag[i]), thrust[i]);
        if out.iter().any(|v| !v.is_finite()) {
            warn!(env = i, wrench = ?out, "non-finite hull wrench");
        }
    }
    buf.world_force.copy_from_slice(dist.forces.get(&positions));
    buf.world_torque.copy_from_slice(dist.torques.get(&positions));
}

pub fn integrate_bodies(settings: Res<SimSettings>, mut fleet: ResMut<Fleet>, buf: Res<EpisodeBuffers>) {
    fleet
        .0
        .integrate(&buf.hull_wrench, &buf.world_force, &buf.world_torque, settings.dt);
}

pub fn update_state(mut buf: ResMut<EpisodeBuffers>) {
    buf.step += 1;
    for p in buf.progress.iter_mut() {
        *p += 1;
    }
}

pub fn calculate_metrics(fleet: Res<Fleet>, mut task: ResMut<TaskState>, buf: ResMut<EpisodeBuffers>) {
    let buf = buf.into_inner();
    let states: Vec<PlanarState> = fleet.0.states.iter().map(VehicleState::planar).collect();
    let rewards = task.0.compute_reward(&states, &buf.actions, buf.step);
    buf.rewards.copy_from_slice(rewards);
}

/// An episode ends on a kill or once `progress` reaches `max_episode_length - 1`.
pub fn is_done(settings: Res<SimSettings>, mut task: ResMut<TaskState>, buf: ResMut<EpisodeBuffers>) {
    let buf = buf.into_inner();
    let kills = task.0.update_kills();
    for (i, reset) in buf.reset.iter_mut().enumerate() {
        *reset = kills[i] || buf.progress[i] + 1 >= settings.max_episode_length;
    }
}

pub fn record_step(
    settings: Res<SimSettings>,
    fleet: Res<Fleet>,
    models: Res<VesselModels>,
    buf: Res<EpisodeBuffers>,
    mut recorder: ResMut<Recorder>,
) {
    let Some(log) = recorder.0.as_mut() else {
        return;
    };
    let env = settings.record_env;
    let s = &fleet.0.states[env];
    log.push(StepRecord {
        step: buf.step,
        position: s.position.to_array(),
        orientation: quat_to_wxyz(s.orientation),
        linear_velocity: s.linear_velocity.to_array(),
        angular_velocity: s.angular_velocity.to_array(),
        actions: buf.actions[env],
        thruster_forces: models.thrusters.thruster_forces()[env],
        hull_wrench: buf.hull_wrench[env],
        reward: buf.rewards[env],
        done: buf.reset[env],
    });
}
