//! Per-environment goal, observation, reward and termination logic.

mod actions;
mod penalties;
mod rewards;
mod spec;
mod stats;

pub use actions::ActionMode;
pub use spec::{
    curriculum_ramp, ObservationFrame, PenaltiesSpec, RewardMode, RewardSpec, SpawnSpec,
    TaskGoalSpec, TaskSpec,
};
pub use stats::{EpisodeStats, EpisodeSummary, StepTerms};

use tracing::debug;

use crate::env_ids::{EnvIds, EnvPhase};
use crate::error::ConfigError;
use crate::math::{planar_to_local, wrap_angle};
use crate::rng::EnvRngs;
use crate::vessel::PlanarState;
use crate::Vec2f;

/// `[cos ψ, sin ψ, vx, vy, ω, task_label, task_data(4)]`
pub const OBS_DIM: usize = 10;

pub type Observation = [f32; OBS_DIM];

#[derive(Debug, Clone)]
pub struct Task {
    spec: TaskSpec,
    label: f32,
    phase: Vec<EnvPhase>,
    goal_reached: Vec<u32>,
    goals: Vec<PlanarState>,
    task_data: Vec<[f32; 4]>,
    /// Position distance to the goal, or to the env origin for velocity tasks.
    position_dist: Vec<f32>,
    primary_dist: Vec<f32>,
    secondary_dist: Vec<f32>,
    observations: Vec<Observation>,
    rewards: Vec<f32>,
    kills: Vec<bool>,
    stats: EpisodeStats,
}

impl Task {
    pub fn new(spec: TaskSpec, num_envs: usize) -> Result<Self, ConfigError> {
        spec.validate()?;
        Ok(Self {
            label: spec.goal.label(),
            spec,
            phase: vec![EnvPhase::Active; num_envs],
            goal_reached: vec![0; num_envs],
            goals: vec![PlanarState::default(); num_envs],
            task_data: vec![[0.0; 4]; num_envs],
            position_dist: vec![0.0; num_envs],
            primary_dist: vec![0.0; num_envs],
            secondary_dist: vec![0.0; num_envs],
            observations: vec![[0.0; OBS_DIM]; num_envs],
            rewards: vec![0.0; num_envs],
            kills: vec![false; num_envs],
            stats: EpisodeStats::new(num_envs),
        })
    }

    pub fn spec(&self) -> &TaskSpec {
        &self.spec
    }

    pub fn num_envs(&self) -> usize {
        self.phase.len()
    }

    pub fn phases(&self) -> &[EnvPhase] {
        &self.phase
    }

    pub fn goal_reached(&self) -> &[u32] {
        &self.goal_reached
    }

    /// Targets; which fields matter depends on the variant.
    pub fn goals(&self) -> &[PlanarState] {
        &self.goals
    }

    pub fn position_distances(&self) -> &[f32] {
        &self.position_dist
    }

    /// Sample a new target for each environment in `ids`.
    pub fn get_goals(&mut self, ids: &EnvIds, rngs: &mut EnvRngs) {
        for id in ids.iter() {
            let g = &mut self.goals[id];
            *g = PlanarState::default();
            match self.spec.goal {
                TaskGoalSpec::GoToXy {
                    goal_random_position: r,
                    ..
                } => {
                    g.position = Vec2f::new(rngs.symmetric(id, r), rngs.symmetric(id, r));
                }
                TaskGoalSpec::GoToPose {
                    goal_random_position: r,
                    ..
                } => {
                    g.position = Vec2f::new(rngs.symmetric(id, r), rngs.symmetric(id, r));
                    g.heading = wrap_angle(rngs.angle(id));
                }
                TaskGoalSpec::TrackXyVelocity {
                    goal_random_linear_velocity: v,
                    ..
                } => {
                    g.linear_velocity = Vec2f::new(rngs.symmetric(id, v), rngs.symmetric(id, v));
                }
                TaskGoalSpec::TrackXyoVelocity {
                    goal_random_linear_velocity: v,
                    goal_random_angular_velocity: w,
                    ..
                } => {
                    g.linear_velocity = Vec2f::new(rngs.symmetric(id, v), rngs.symmetric(id, v));
                    g.angular_velocity = rngs.symmetric(id, w);
                }
            }
        }
    }

    /// Initial state for each environment in `ids`, relative to its origin.
    /// The spawn distance widens with `step` following the spawn curriculum.
    /// Every variant starts with a per-axis `U(-max_spawn_speed, max_spawn_speed)`
    /// world velocity.
    pub fn get_spawns(
        &mut self,
        ids: &EnvIds,
        step: u64,
        rngs: &mut EnvRngs,
    ) -> Vec<(usize, PlanarState)> {
        ids.fill(&mut self.goal_reached, 0);
        let sp = self.spec.spawn;
        let ramp = curriculum_ramp(step, sp.curriculum_steps);
        let max_d = sp.min_distance + (sp.max_distance - sp.min_distance) * ramp;
        let spawns: Vec<_> = ids
            .iter()
            .map(|id| {
                let mut s = PlanarState::default();
                if self.spec.goal.is_position_task() {
                    let r = rngs.uniform(id, sp.min_distance, max_d);
                    let theta = rngs.angle(id);
                    s.position = self.goals[id].position + Vec2f::new(theta.cos(), theta.sin()) * r;
                    s.heading = wrap_angle(rngs.angle(id));
                } else {
                    s.heading = rngs.uniform(id, 0.0, std::f32::consts::PI);
                }
                let v = sp.max_spawn_speed;
                s.linear_velocity = Vec2f::new(rngs.symmetric(id, v), rngs.symmetric(id, v));
                (id, s)
            })
            .collect();
        debug!(envs = ids.len(), step, max_distance = max_d, "spawns drawn");
        spawns
    }

    fn update_errors(&mut self, states: &[PlanarState]) {
        debug_assert_eq!(states.len(), self.num_envs(), "one state per environment");
        for (i, s) in states.iter().enumerate() {
            let g = &self.goals[i];
            let (data, pos_d, primary, secondary) = match self.spec.goal {
                TaskGoalSpec::GoToXy { .. } => {
                    let e = g.position - s.position;
                    ([e.x, e.y, 0.0, 0.0], e.length(), e.length(), 0.0)
                }
                TaskGoalSpec::GoToPose { .. } => {
                    let e = g.position - s.position;
                    let he = wrap_angle(g.heading - s.heading);
                    (
                        [e.x, e.y, he.cos(), he.sin()],
                        e.length(),
                        e.length(),
                        he.abs(),
                    )
                }
                TaskGoalSpec::TrackXyVelocity { .. } => {
                    let e = g.linear_velocity - s.linear_velocity;
                    ([e.x, e.y, 0.0, 0.0], s.position.length(), e.length(), 0.0)
                }
                TaskGoalSpec::TrackXyoVelocity { .. } => {
                    let e = g.linear_velocity - s.linear_velocity;
                    let we = g.angular_velocity - s.angular_velocity;
                    ([e.x, e.y, we, 0.0], s.position.length(), e.length(), we.abs())
                }
            };
            self.task_data[i] = data;
            self.position_dist[i] = pos_d;
            self.primary_dist[i] = primary;
            self.secondary_dist[i] = secondary;
        }
    }

    /// Build the observation of every environment from (possibly noisy) state.
    pub fn get_state_observations(&mut self, states: &[PlanarState]) -> &[Observation] {
        self.update_errors(states);
        let local = self.spec.observation_frame == ObservationFrame::Local;
        for (i, s) in states.iter().enumerate() {
            let mut data = self.task_data[i];
            let mut vel = s.linear_velocity;
            if local {
                vel = planar_to_local(vel, s.heading);
                let e = planar_to_local(Vec2f::new(data[0], data[1]), s.heading);
                data[0] = e.x;
                data[1] = e.y;
            }
            let (sin, cos) = s.heading.sin_cos();
            self.observations[i] = [
                cos,
                sin,
                vel.x,
                vel.y,
                s.angular_velocity,
                self.label,
                data[0],
                data[1],
                data[2],
                data[3],
            ];
        }
        &self.observations
    }

    /// Shaped reward minus penalties. Also advances the in-tolerance streak:
    /// +1 while every tracked error is within tolerance, back to 0 otherwise.
    pub fn compute_reward(
        &mut self,
        states: &[PlanarState],
        actions: &[[f32; 2]],
        step: u64,
    ) -> &[f32] {
        self.update_errors(states);
        let rs = self.spec.reward;
        for i in 0..self.num_envs() {
            let (p, s) = (self.primary_dist[i], self.secondary_dist[i]);
            let (reached, secondary_weight) = match self.spec.goal {
                TaskGoalSpec::GoToXy {
                    position_tolerance, ..
                } => (p < position_tolerance, 0.0),
                TaskGoalSpec::GoToPose {
                    position_tolerance,
                    heading_tolerance,
                    ..
                } => (p < position_tolerance && s < heading_tolerance, rs.heading_weight),
                TaskGoalSpec::TrackXyVelocity {
                    lin_vel_tolerance, ..
                } => (p < lin_vel_tolerance, 0.0),
                TaskGoalSpec::TrackXyoVelocity {
                    lin_vel_tolerance,
                    ang_vel_tolerance,
                    ..
                } => (
                    p < lin_vel_tolerance && s < ang_vel_tolerance,
                    rs.angular_velocity_weight,
                ),
            };
            self.goal_reached[i] = if reached { self.goal_reached[i] + 1 } else { 0 };

            let mut reward = rs.primary(p);
            if secondary_weight != 0.0 {
                reward += rs.secondary(s, secondary_weight);
            }
            let penalty = self.spec.penalties.compute(&states[i], &actions[i], step);
            self.rewards[i] = reward - penalty;
            let st = &states[i];
            self.stats.accumulate(
                i,
                &StepTerms {
                    reward: self.rewards[i],
                    primary_error: p,
                    secondary_error: s,
                    penalty,
                    linear_speed: st.linear_velocity.length(),
                    angular_speed: st.angular_velocity.abs(),
                    action_sum: actions[i].iter().map(|a| a.abs()).sum(),
                },
            );
        }
        &self.rewards
    }

    /// Flag environments that drifted past `kill_dist` or stayed in tolerance
    /// long enough, and mark them terminated.
    pub fn update_kills(&mut self) -> &[bool] {
        let n = self.spec.kill_after_n_steps_in_tolerance;
        for i in 0..self.num_envs() {
            let die = self.position_dist[i] > self.spec.kill_dist || self.goal_reached[i] > n;
            self.kills[i] = die;
            if die {
                self.phase[i] = EnvPhase::Terminated;
            }
        }
        &self.kills
    }

    pub fn reset(&mut self, ids: &EnvIds) {
        ids.fill(&mut self.goal_reached, 0);
        ids.fill(&mut self.kills, false);
        ids.fill(&mut self.phase, EnvPhase::Active);
    }

    pub fn flush_stats(&mut self, ids: &EnvIds, max_episode_length: u32) -> EpisodeSummary {
        self.stats.flush(ids, max_episode_length)
    }
}
