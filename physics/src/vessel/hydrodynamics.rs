use tracing::debug;

use crate::env_ids::EnvIds;
use crate::error::ConfigError;
use crate::math::{world_to_local, Wrench};
use crate::rng::EnvRngs;
use crate::spec::{HydrodynamicsSpec, WaterCurrentSpec};
use crate::{Quatf, Vec3f};

/// Linear + quadratic damping (Antonelli: viscous drag and lift grouped into
/// a diagonal damping matrix) with per-environment coefficients.
#[derive(Debug, Clone)]
pub struct Hydrodynamics {
    base_linear: [f32; 6],
    base_quadratic: [f32; 6],
    linear: Vec<[f32; 6]>,
    quadratic: Vec<[f32; 6]>,
    forward_speed: [f32; 6],
    offset_linear: f32,
    offset_forward_speed: f32,
    offset_nonlin: f32,
    scaling: f32,
    randomize: bool,
    linear_rand: [f32; 6],
    quad_rand: [f32; 6],
    current: Option<Vec3f>,
    local_velocity: Vec<[f32; 6]>,
    drag: Vec<Wrench>,
}

impl Hydrodynamics {
    /// Builds the coefficient buffers and, when randomization is enabled,
    /// draws the first perturbation for every environment.
    pub fn new(
        spec: &HydrodynamicsSpec,
        current: &WaterCurrentSpec,
        num_envs: usize,
        rngs: &mut EnvRngs,
    ) -> Result<Self, ConfigError> {
        spec.validate()?;
        if rngs.len() < num_envs {
            return Err(ConfigError::DimensionMismatch {
                key: "hydrodynamics.rngs",
                expected: num_envs,
                got: rngs.len(),
            });
        }
        let r = &spec.randomization;
        let mut linear_rand = [0.0; 6];
        let mut quad_rand = [0.0; 6];
        for k in 0..6 {
            linear_rand[k] = (r.linear[k] * spec.linear_damping[k]).abs();
            quad_rand[k] = (r.quadratic[k] * spec.quadratic_damping[k]).abs();
        }
        let mut this = Self {
            base_linear: spec.linear_damping,
            base_quadratic: spec.quadratic_damping,
            linear: vec![spec.linear_damping; num_envs],
            quadratic: vec![spec.quadratic_damping; num_envs],
            forward_speed: spec.linear_damping_forward_speed,
            offset_linear: spec.offset_linear_damping,
            offset_forward_speed: spec.offset_lin_forward_damping_speed,
            offset_nonlin: spec.offset_nonlin_damping,
            scaling: spec.scaling_damping,
            randomize: r.enabled,
            linear_rand,
            quad_rand,
            current: current
                .enabled
                .then(|| Vec3f::from_array(current.flow_velocity)),
            local_velocity: vec![[0.0; 6]; num_envs],
            drag: vec![[0.0; 6]; num_envs],
        };
        this.reset_coefficients(&EnvIds::all(num_envs), rngs);
        Ok(this)
    }

    /// Redraw the damping coefficients of `ids` around the base values. The
    /// other environments keep theirs.
    pub fn reset_coefficients(&mut self, ids: &EnvIds, rngs: &mut EnvRngs) {
        if !self.randomize {
            return;
        }
        for id in ids.iter() {
            for k in 0..6 {
                self.linear[id][k] = self.base_linear[k] + rngs.symmetric(id, self.linear_rand[k]);
                self.quadratic[id][k] =
                    self.base_quadratic[k] + rngs.symmetric(id, self.quad_rand[k]);
            }
        }
        debug!(envs = ids.len(), "resampled damping coefficients");
    }

    /// Current `(linear, quadratic)` coefficients of one environment.
    pub fn coefficients(&self, env: usize) -> ([f32; 6], [f32; 6]) {
        (self.linear[env], self.quadratic[env])
    }

    /// Half-width of the uniform perturbation per axis.
    pub fn randomization_ranges(&self) -> ([f32; 6], [f32; 6]) {
        (self.linear_rand, self.quad_rand)
    }

    /// Body-frame velocities (water-relative when current is enabled) used by
    /// the latest `compute_hydrodynamics`.
    pub fn local_velocities(&self) -> &[[f32; 6]] {
        &self.local_velocity
    }

    /// Diagonal of the damping matrix for `vel` in environment `env`.
    pub fn damping_matrix(&self, env: usize, vel: &[f32; 6]) -> [f32; 6] {
        let lin = &self.linear[env];
        let quad = &self.quadratic[env];
        let mut d = [0.0; 6];
        for k in 0..6 {
            let lin_k = lin[k] + self.offset_linear
                - (self.forward_speed[k] + self.offset_forward_speed);
            let quad_k = (quad[k] + self.offset_nonlin) * vel[k].abs();
            d[k] = (lin_k + quad_k) * self.scaling;
        }
        d
    }

    fn drag_of(&self, env: usize, vel: &[f32; 6]) -> Wrench {
        let d = self.damping_matrix(env, vel);
        let mut out = [0.0; 6];
        for k in 0..6 {
            out[k] = -d[k] * vel[k];
        }
        out
    }

    /// Drag wrench from body-frame velocities `[u, v, w, p, q, r]`.
    pub fn compute_drag(&mut self, velocity_body: &[[f32; 6]]) -> &[Wrench] {
        debug_assert_eq!(
            velocity_body.len(),
            self.drag.len(),
            "one body velocity per environment"
        );
        for (i, v) in velocity_body.iter().enumerate() {
            let d = self.drag_of(i, v);
            self.drag[i] = d;
        }
        &self.drag
    }

    /// Rotate world-frame twists into the body frame, subtract the water
    /// current from the linear part, then compute drag.
    pub fn compute_hydrodynamics(
        &mut self,
        orientations: &[Quatf],
        world_velocity: &[[f32; 6]],
    ) -> &[Wrench] {
        debug_assert_eq!(orientations.len(), self.drag.len());
        debug_assert_eq!(world_velocity.len(), self.drag.len());
        for (i, (q, w)) in orientations.iter().zip(world_velocity).enumerate() {
            let r = world_to_local(*q);
            let mut lin = r * Vec3f::new(w[0], w[1], w[2]);
            let ang = r * Vec3f::new(w[3], w[4], w[5]);
            if let Some(flow) = self.current {
                lin -= r * flow;
            }
            self.local_velocity[i] = [lin.x, lin.y, lin.z, ang.x, ang.y, ang.z];
        }
        for i in 0..self.drag.len() {
            let v = self.local_velocity[i];
            let d = self.drag_of(i, &v);
            self.drag[i] = d;
        }
        &self.drag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::heron_spec;

    fn unit_spec() -> HydrodynamicsSpec {
        let mut s = heron_spec().hydrodynamics;
        s.linear_damping = [1.0; 6];
        s.quadratic_damping = [0.0; 6];
        s.linear_damping_forward_speed = [0.0; 6];
        s.offset_linear_damping = 0.0;
        s.offset_lin_forward_damping_speed = 0.0;
        s.offset_nonlin_damping = 0.0;
        s.scaling_damping = 1.0;
        s.randomization.enabled = false;
        s
    }

    fn build(spec: &HydrodynamicsSpec, n: usize, seed: u64) -> (Hydrodynamics, EnvRngs) {
        let mut rngs = EnvRngs::new(n, seed);
        let h = Hydrodynamics::new(spec, &WaterCurrentSpec::default(), n, &mut rngs).unwrap();
        (h, rngs)
    }

    #[test]
    fn unit_linear_drag_scenario() {
        let (mut h, _) = build(&unit_spec(), 1, 0);
        let drag = h.compute_drag(&[[2.0, 0.0, 0.0, 0.0, 0.0, 0.0]]);
        assert_eq!(drag[0], [-2.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "one body velocity per environment")]
    fn short_velocity_batch_panics_in_debug() {
        let (mut h, _) = build(&unit_spec(), 2, 0);
        h.compute_drag(&[[0.0; 6]]);
    }

    #[test]
    fn zero_velocity_zero_drag() {
        let (mut h, _) = build(&heron_spec().hydrodynamics, 8, 5);
        for w in h.compute_drag(&[[0.0; 6]; 8]) {
            assert_eq!(*w, [0.0; 6]);
        }
    }

    #[test]
    fn drag_magnitude_grows_with_speed() {
        let mut spec = heron_spec().hydrodynamics;
        spec.randomization.enabled = false;
        let (mut h, _) = build(&spec, 1, 0);
        let mut prev = [0.0f32; 6];
        for step in 0..40 {
            let s = step as f32 * 0.1;
            let drag = h.compute_drag(&[[s, -s, s, s, -s, s]])[0];
            for k in 0..6 {
                assert!(drag[k].abs() >= prev[k], "axis {k} at speed {s}");
            }
            prev = drag.map(f32::abs);
        }
    }

    #[test]
    fn quadratic_term_uses_abs_velocity() {
        let mut spec = unit_spec();
        spec.linear_damping = [0.0; 6];
        spec.quadratic_damping = [2.0; 6];
        let (mut h, _) = build(&spec, 1, 0);
        let drag = h.compute_drag(&[[-3.0, 0.0, 0.0, 0.0, 0.0, 0.0]])[0];
        assert_eq!(drag[0], 18.0);
    }

    #[test]
    fn offsets_and_scaling_enter_matrix() {
        let mut spec = unit_spec();
        spec.offset_linear_damping = 0.5;
        spec.offset_lin_forward_damping_speed = 0.25;
        spec.linear_damping_forward_speed = [0.25; 6];
        spec.quadratic_damping = [1.0; 6];
        spec.offset_nonlin_damping = 1.0;
        spec.scaling_damping = 2.0;
        let (h, _) = build(&spec, 1, 0);
        let d = h.damping_matrix(0, &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        // (1 + 0.5 - 0.5 + 2 * 1) * 2
        assert!((d[0] - 6.0).abs() < 1e-6, "{d:?}");
        assert!((d[1] - 2.0).abs() < 1e-6, "{d:?}");
    }

    #[test]
    fn water_current_is_subtracted_in_body_frame() {
        let mut rngs = EnvRngs::new(1, 0);
        let current = WaterCurrentSpec {
            enabled: true,
            flow_velocity: [0.5, 0.0, 0.0],
        };
        let mut h = Hydrodynamics::new(&unit_spec(), &current, 1, &mut rngs).unwrap();
        // Drifting with the current: no relative motion, no drag.
        let q = Quatf::from_rotation_z(0.8);
        let drag = h.compute_hydrodynamics(&[q], &[[0.5, 0.0, 0.0, 0.0, 0.0, 0.0]])[0];
        for v in drag {
            assert!(v.abs() < 1e-6, "{drag:?}");
        }
    }

    #[test]
    fn world_velocity_is_rotated_into_body() {
        let (mut h, _) = build(&unit_spec(), 1, 0);
        let q = Quatf::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let drag = h.compute_hydrodynamics(&[q], &[[0.0, 1.0, 0.0, 0.0, 0.0, 0.3]])[0];
        // Moving along world +Y while facing +Y is pure surge.
        assert!((drag[0] + 1.0).abs() < 1e-6, "{drag:?}");
        assert!(drag[1].abs() < 1e-6);
        assert!((drag[5] + 0.3).abs() < 1e-6);
    }

    #[test]
    fn disabled_randomization_keeps_base() {
        let mut spec = heron_spec().hydrodynamics;
        spec.randomization.enabled = false;
        let (mut h, mut rngs) = build(&spec, 4, 9);
        h.reset_coefficients(&EnvIds::new([1, 3], 4), &mut rngs);
        for env in 0..4 {
            assert_eq!(h.coefficients(env), (spec.linear_damping, spec.quadratic_damping));
        }
    }

    #[test]
    fn reset_draws_within_range_and_leaves_others() {
        let spec = heron_spec().hydrodynamics;
        let (mut h, mut rngs) = build(&spec, 6, 21);
        let (lin_r, quad_r) = h.randomization_ranges();
        let before: Vec<_> = (0..6).map(|e| h.coefficients(e)).collect();
        for _ in 0..50 {
            h.reset_coefficients(&EnvIds::new([2, 4], 6), &mut rngs);
            for env in [2, 4] {
                let (lin, quad) = h.coefficients(env);
                for k in 0..6 {
                    assert!((lin[k] - spec.linear_damping[k]).abs() <= lin_r[k] + 1e-5);
                    assert!((quad[k] - spec.quadratic_damping[k]).abs() <= quad_r[k] + 1e-5);
                }
            }
        }
        for env in [0, 1, 3, 5] {
            assert_eq!(h.coefficients(env), before[env], "env {env} must be untouched");
        }
    }

    #[test]
    fn reset_result_does_not_depend_on_batch() {
        let spec = heron_spec().hydrodynamics;
        let (mut a, mut ra) = build(&spec, 4, 77);
        let (mut b, mut rb) = build(&spec, 4, 77);
        a.reset_coefficients(&EnvIds::new([1], 4), &mut ra);
        b.reset_coefficients(&EnvIds::new([0, 1, 2, 3], 4), &mut rb);
        assert_eq!(a.coefficients(1), b.coefficients(1));
    }
}
