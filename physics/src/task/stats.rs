use serde::{Deserialize, Serialize};

use crate::env_ids::EnvIds;

/// Per-step terms folded into the episode sums.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepTerms {
    pub reward: f32,
    pub primary_error: f32,
    pub secondary_error: f32,
    pub penalty: f32,
    /// `|v|` in the plane.
    pub linear_speed: f32,
    /// `|ω|` about z.
    pub angular_speed: f32,
    /// `Σ|a|` over the action vector.
    pub action_sum: f32,
}

/// Running per-environment sums over the current episode.
#[derive(Debug, Clone)]
pub struct EpisodeStats {
    sums: Vec<StepTerms>,
}

/// Per-step means of a batch of finished episodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episodes: usize,
    pub reward: f32,
    pub primary_error: f32,
    pub secondary_error: f32,
    pub penalty: f32,
    pub linear_speed: f32,
    pub angular_speed: f32,
    pub action_sum: f32,
}

impl EpisodeStats {
    pub fn new(num_envs: usize) -> Self {
        Self {
            sums: vec![StepTerms::default(); num_envs],
        }
    }

    pub fn accumulate(&mut self, env: usize, t: &StepTerms) {
        let s = &mut self.sums[env];
        s.reward += t.reward;
        s.primary_error += t.primary_error;
        s.secondary_error += t.secondary_error;
        s.penalty += t.penalty;
        s.linear_speed += t.linear_speed;
        s.angular_speed += t.angular_speed;
        s.action_sum += t.action_sum;
    }

    /// Average the sums of `ids` over `max_episode_length` and across the
    /// batch, then zero them.
    pub fn flush(&mut self, ids: &EnvIds, max_episode_length: u32) -> EpisodeSummary {
        let mut s = EpisodeSummary {
            episodes: ids.len(),
            ..Default::default()
        };
        if ids.is_empty() {
            return s;
        }
        let norm = max_episode_length.max(1) as f32 * ids.len() as f32;
        for id in ids.iter() {
            let t = &self.sums[id];
            s.reward += t.reward / norm;
            s.primary_error += t.primary_error / norm;
            s.secondary_error += t.secondary_error / norm;
            s.penalty += t.penalty / norm;
            s.linear_speed += t.linear_speed / norm;
            s.angular_speed += t.angular_speed / norm;
            s.action_sum += t.action_sum / norm;
        }
        ids.fill(&mut self.sums, StepTerms::default());
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(reward: f32, primary: f32, penalty: f32) -> StepTerms {
        StepTerms {
            reward,
            primary_error: primary,
            penalty,
            ..Default::default()
        }
    }

    #[test]
    fn flush_averages_and_zeroes_selected() {
        let mut st = EpisodeStats::new(3);
        for _ in 0..10 {
            st.accumulate(0, &terms(1.0, 0.5, 0.1));
            st.accumulate(1, &terms(0.5, 0.5, 0.1));
            st.accumulate(2, &terms(2.0, 0.0, 0.0));
        }
        let s = st.flush(&EnvIds::new([0, 1], 3), 10);
        assert_eq!(s.episodes, 2);
        assert!((s.reward - 0.75).abs() < 1e-6);
        assert!((s.primary_error - 0.5).abs() < 1e-6);
        let again = st.flush(&EnvIds::new([0, 1], 3), 10);
        assert_eq!(again.reward, 0.0);
        let untouched = st.flush(&EnvIds::new([2], 3), 10);
        assert!((untouched.reward - 2.0).abs() < 1e-6);
    }

    #[test]
    fn motion_and_effort_sums_are_averaged() {
        let mut st = EpisodeStats::new(2);
        let moving = StepTerms {
            linear_speed: 1.2,
            angular_speed: 0.4,
            action_sum: 1.5,
            ..Default::default()
        };
        for _ in 0..5 {
            st.accumulate(0, &moving);
        }
        st.accumulate(1, &moving);
        let s = st.flush(&EnvIds::new([0], 2), 5);
        assert!((s.linear_speed - 1.2).abs() < 1e-5, "{s:?}");
        assert!((s.angular_speed - 0.4).abs() < 1e-5, "{s:?}");
        assert!((s.action_sum - 1.5).abs() < 1e-5, "{s:?}");
        let rest = st.flush(&EnvIds::new([1], 2), 5);
        assert!((rest.linear_speed - 0.24).abs() < 1e-5, "{rest:?}");
    }
}
