use super::spec::{RewardMode, RewardSpec};

impl RewardMode {
    /// Map a non-negative error distance to a reward in `(0, 1]`.
    pub fn shape(self, distance: f32, exponential_coeff: f32) -> f32 {
        match self {
            Self::Linear => 1.0 / (1.0 + distance),
            Self::Square => 1.0 / (1.0 + distance * distance),
            Self::Exponential => (-distance / exponential_coeff).exp(),
        }
    }
}

impl RewardSpec {
    /// Reward for the primary error term.
    pub fn primary(&self, distance: f32) -> f32 {
        self.mode.shape(distance, self.exponential_reward_coeff)
    }

    /// Weighted reward for the secondary term (heading or angular velocity).
    pub fn secondary(&self, distance: f32, weight: f32) -> f32 {
        weight * self.mode.shape(distance, self.exponential_reward_coeff)
    }
}
