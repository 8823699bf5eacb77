use bevy::prelude::Resource;
use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use physics::task::{ObservationFrame, TaskSpec};
use physics::{planar_to_local, ActionMode, Observation, Vec2f};

/// Stand-in controllers for smoke runs; a trained policy would plug in here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    /// Thrusters idle.
    Zero,
    /// Uniform random commands.
    Random,
    /// Proportional controller on the task error.
    #[default]
    Seek,
}

#[derive(Resource, Debug)]
pub struct Policy {
    kind: PolicyKind,
    frame: ObservationFrame,
    position_task: bool,
    rng: StdRng,
}

impl Policy {
    pub fn new(kind: PolicyKind, task: &TaskSpec, seed: u64) -> Self {
        Self {
            kind,
            frame: task.observation_frame,
            position_task: task.goal.is_position_task(),
            rng: StdRng::seed_from_u64(seed ^ 0x5eed_0f_9011c7),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        self.kind
    }

    /// Raw action for one observation, in the convention of `mode`.
    pub fn act(&mut self, obs: &Observation, mode: ActionMode) -> [f32; 2] {
        let cmd = match self.kind {
            PolicyKind::Zero => [0.0, 0.0],
            PolicyKind::Random => [self.rng.gen_range(-1.0..=1.0), self.rng.gen_range(-1.0..=1.0)],
            PolicyKind::Seek => self.seek(obs),
        };
        match mode {
            ActionMode::Continuous => cmd,
            ActionMode::MultiDiscrete => cmd.map(|c| if c > 0.0 { 1.0 } else { 0.0 }),
        }
    }

    fn seek(&self, obs: &Observation) -> [f32; 2] {
        let heading = obs[1].atan2(obs[0]);
        let mut err = Vec2f::new(obs[6], obs[7]);
        if self.frame == ObservationFrame::Global {
            err = planar_to_local(err, heading);
        }
        let (forward, turn) = if self.position_task {
            if err.length() < 0.05 {
                (0.0, 0.0)
            } else {
                let bearing = err.y.atan2(err.x);
                let fwd = (0.6 * err.length()).min(1.0) * bearing.cos().max(0.0);
                (fwd, bearing)
            }
        } else {
            // Velocity error along the bow, yaw-rate error in slot 8 (zero
            // when the task does not track it).
            (2.0 * err.x, 2.0 * obs[8] + err.y)
        };
        let turn = turn.clamp(-1.0, 1.0) * 0.5;
        // The port thruster sits at +y: more thrust on starboard turns to port.
        [
            (forward - turn).clamp(-1.0, 1.0),
            (forward + turn).clamp(-1.0, 1.0),
        ]
    }
}
