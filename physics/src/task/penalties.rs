use super::spec::{curriculum_ramp, PenaltiesSpec};
use crate::vessel::PlanarState;

impl PenaltiesSpec {
    /// Non-negative penalty for one environment, to be subtracted from the
    /// reward. Weights ramp in with the training step when a curriculum is set.
    pub fn compute(&self, state: &PlanarState, action: &[f32], step: u64) -> f32 {
        let ramp = curriculum_ramp(step, self.curriculum_steps);
        let lin = self.linear_velocity_weight * state.linear_velocity.length();
        let ang = self.angular_velocity_weight * state.angular_velocity.abs();
        let act = self.action_weight * action.iter().map(|a| a.abs()).sum::<f32>();
        ramp * (lin + ang + act)
    }
}
