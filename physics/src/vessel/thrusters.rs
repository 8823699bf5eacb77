use tracing::debug;

use crate::env_ids::EnvIds;
use crate::error::{require_positive, ConfigError};
use crate::math::{wrench, Wrench};
use crate::rng::EnvRngs;
use crate::spec::ThrusterSpec;
use crate::Vec3f;

pub const NUM_THRUSTERS: usize = 2;

/// Command → thrust lookup, sampled once at construction.
#[derive(Debug, Clone)]
pub struct CalibrationCurve {
    cmd_lower: f32,
    cmd_upper: f32,
    deadband: [f32; 2],
    spacing: f32,
    table: Vec<f32>,
}

impl CalibrationCurve {
    pub fn from_spec(spec: &ThrusterSpec) -> Result<Self, ConfigError> {
        spec.validate()?;
        let n = spec.interpolation.points_for_interpolation;
        let (lo, hi) = (spec.cmd_lower_range, spec.cmd_upper_range);
        let spacing = (hi - lo) / (n - 1) as f32;

        // The deadband edges act as zero-thrust anchors for each side.
        let mut left = spec.interpolation.left.clone();
        left.push([spec.deadband[0], 0.0]);
        let mut right = vec![[spec.deadband[1], 0.0]];
        right.extend_from_slice(&spec.interpolation.right);

        let table = (0..n)
            .map(|k| {
                let cmd = lo + spacing * k as f32;
                if cmd < spec.deadband[0] {
                    if cmd < left[0][0] {
                        polyval(&spec.least_squares.neg_cmd_coeff, cmd)
                    } else {
                        interp(&left, cmd)
                    }
                } else if cmd > spec.deadband[1] {
                    if cmd > right[right.len() - 1][0] {
                        polyval(&spec.least_squares.pos_cmd_coeff, cmd)
                    } else {
                        interp(&right, cmd)
                    }
                } else {
                    0.0
                }
            })
            .collect();

        Ok(Self {
            cmd_lower: lo,
            cmd_upper: hi,
            deadband: spec.deadband,
            spacing,
            table,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.table
    }

    /// Thrust (N) for a command. Commands are clamped to the calibrated range;
    /// the deadband yields exactly zero.
    pub fn thrust(&self, cmd: f32) -> f32 {
        let cmd = cmd.clamp(self.cmd_lower, self.cmd_upper);
        if cmd >= self.deadband[0] && cmd <= self.deadband[1] {
            return 0.0;
        }
        let pos = (cmd - self.cmd_lower) / self.spacing;
        let last = self.table.len() - 1;
        let i = (pos.floor() as usize).min(last - 1);
        let t = (pos - i as f32).clamp(0.0, 1.0);
        self.table[i] + (self.table[i + 1] - self.table[i]) * t
    }
}

/// Piecewise-linear interpolation over points sorted by `x`. `x` must lie
/// within the first and last point.
fn interp(points: &[[f32; 2]], x: f32) -> f32 {
    let j = points.partition_point(|p| p[0] <= x).clamp(1, points.len() - 1);
    let [x0, y0] = points[j - 1];
    let [x1, y1] = points[j];
    if x1 == x0 {
        return y1;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Horner evaluation, highest degree first.
fn polyval(coeffs: &[f32], x: f32) -> f32 {
    coeffs.iter().fold(0.0, |acc, c| acc * x + c)
}

/// Two fixed thrusters per hull with first-order lag dynamics.
#[derive(Debug, Clone)]
pub struct Thrusters {
    curve: CalibrationCurve,
    dt: f32,
    base_tau: f32,
    positions: [Vec3f; NUM_THRUSTERS],
    split_thrust: bool,
    randomize: bool,
    gain_rand: [f32; NUM_THRUSTERS],
    tau_rand: f32,
    gains: Vec<[f32; NUM_THRUSTERS]>,
    tau: Vec<f32>,
    target: Vec<[f32; NUM_THRUSTERS]>,
    force: Vec<[f32; NUM_THRUSTERS]>,
    out: Vec<Wrench>,
}

impl Thrusters {
    pub fn new(
        spec: &ThrusterSpec,
        dt: f32,
        num_envs: usize,
        rngs: &mut EnvRngs,
    ) -> Result<Self, ConfigError> {
        require_positive("thrusters.dt", dt)?;
        let curve = CalibrationCurve::from_spec(spec)?;
        if rngs.len() < num_envs {
            return Err(ConfigError::DimensionMismatch {
                key: "thrusters.rngs",
                expected: num_envs,
                got: rngs.len(),
            });
        }
        let r = &spec.randomization;
        let mut this = Self {
            curve,
            dt,
            base_tau: spec.time_constant,
            positions: spec.positions.map(Vec3f::from_array),
            split_thrust: spec.split_thrust,
            randomize: r.enabled,
            gain_rand: [r.left_gain, r.right_gain],
            tau_rand: r.time_constant,
            gains: vec![[1.0; NUM_THRUSTERS]; num_envs],
            tau: vec![spec.time_constant; num_envs],
            target: vec![[0.0; NUM_THRUSTERS]; num_envs],
            force: vec![[0.0; NUM_THRUSTERS]; num_envs],
            out: vec![[0.0; 6]; num_envs],
        };
        this.reset_thruster_randomization(&EnvIds::all(num_envs), rngs);
        debug!(num_envs, dt, tau = spec.time_constant, "thrusters ready");
        Ok(this)
    }

    pub fn curve(&self) -> &CalibrationCurve {
        &self.curve
    }

    /// Commands in `[-1, 1]` for the left and right thruster of every env.
    pub fn set_target(&mut self, cmds: &[[f32; NUM_THRUSTERS]]) {
        debug_assert_eq!(cmds.len(), self.target.len(), "one command pair per environment");
        let share = if self.split_thrust {
            1.0 / NUM_THRUSTERS as f32
        } else {
            1.0
        };
        for (i, cmd) in cmds.iter().enumerate() {
            for k in 0..NUM_THRUSTERS {
                let thrust = self.curve.thrust(cmd[k].clamp(-1.0, 1.0));
                self.target[i][k] = thrust * self.gains[i][k] * share;
            }
        }
    }

    /// Advance the lag filter by one `dt` and return the hull wrench.
    pub fn step(&mut self) -> &[Wrench] {
        for i in 0..self.out.len() {
            let alpha = (self.dt / self.tau[i]).min(1.0);
            let mut force = Vec3f::ZERO;
            let mut torque = Vec3f::ZERO;
            for k in 0..NUM_THRUSTERS {
                let f = &mut self.force[i][k];
                *f += (self.target[i][k] - *f) * alpha;
                let push = Vec3f::new(*f, 0.0, 0.0);
                force += push;
                torque += self.positions[k].cross(push);
            }
            self.out[i] = wrench(force, torque);
        }
        &self.out
    }

    pub fn reset(&mut self, ids: &EnvIds) {
        ids.fill(&mut self.target, [0.0; NUM_THRUSTERS]);
        ids.fill(&mut self.force, [0.0; NUM_THRUSTERS]);
        ids.fill(&mut self.out, [0.0; 6]);
    }

    pub fn reset_thruster_randomization(&mut self, ids: &EnvIds, rngs: &mut EnvRngs) {
        for id in ids.iter() {
            if self.randomize {
                for k in 0..NUM_THRUSTERS {
                    self.gains[id][k] = 1.0 + rngs.symmetric(id, self.gain_rand[k]);
                }
                self.tau[id] = self.base_tau * (1.0 + rngs.symmetric(id, self.tau_rand));
            } else {
                self.gains[id] = [1.0; NUM_THRUSTERS];
                self.tau[id] = self.base_tau;
            }
        }
    }

    /// Current body-frame force (along +x) of each thruster.
    pub fn thruster_forces(&self) -> &[[f32; NUM_THRUSTERS]] {
        &self.force
    }

    pub fn targets(&self) -> &[[f32; NUM_THRUSTERS]] {
        &self.target
    }

    pub fn time_constants(&self) -> &[f32] {
        &self.tau
    }

    pub fn gains(&self) -> &[[f32; NUM_THRUSTERS]] {
        &self.gains
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::heron_spec;

    fn plain_spec() -> ThrusterSpec {
        let mut s = heron_spec().thrusters;
        s.randomization.enabled = false;
        s
    }

    fn build(spec: &ThrusterSpec, dt: f32, n: usize) -> Thrusters {
        let mut rngs = EnvRngs::new(n, 1);
        Thrusters::new(spec, dt, n, &mut rngs).unwrap()
    }

    #[test]
    fn deadband_maps_to_zero() {
        let curve = CalibrationCurve::from_spec(&plain_spec()).unwrap();
        for cmd in [-0.05, -0.02, 0.0, 0.03, 0.05] {
            assert_eq!(curve.thrust(cmd), 0.0, "cmd {cmd}");
        }
        assert!(curve.thrust(0.3) > 0.0);
        assert!(curve.thrust(-0.3) < 0.0);
    }

    #[test]
    fn table_follows_calibration_points() {
        let spec = plain_spec();
        let curve = CalibrationCurve::from_spec(&spec).unwrap();
        for p in spec.interpolation.left.iter().chain(&spec.interpolation.right) {
            let got = curve.thrust(p[0]);
            // Sampling across a kink in the calibration polyline costs a little.
            assert!((got - p[1]).abs() < 0.25, "cmd {} -> {got}, expected {}", p[0], p[1]);
        }
    }

    #[test]
    fn polynomial_extends_beyond_calibration() {
        let spec = plain_spec();
        let curve = CalibrationCurve::from_spec(&spec).unwrap();
        let hi = polyval(&spec.least_squares.pos_cmd_coeff, 1.0);
        let lo = polyval(&spec.least_squares.neg_cmd_coeff, -1.0);
        assert!((curve.thrust(1.0) - hi).abs() < 1e-3, "{} vs {hi}", curve.thrust(1.0));
        assert!((curve.thrust(-1.0) - lo).abs() < 1e-3, "{} vs {lo}", curve.thrust(-1.0));
        let mid = polyval(&spec.least_squares.pos_cmd_coeff, 0.95);
        assert!((curve.thrust(0.95) - mid).abs() < 1e-2);
    }

    #[test]
    fn monotone_over_calibrated_range() {
        let curve = CalibrationCurve::from_spec(&plain_spec()).unwrap();
        let mut prev = curve.thrust(-0.9);
        for k in 1..=180 {
            let cmd = -0.9 + k as f32 * 0.01;
            let f = curve.thrust(cmd);
            assert!(f >= prev - 1e-4, "cmd {cmd}: {prev} then {f}");
            prev = f;
        }
    }

    #[test]
    fn lag_converges_geometrically() {
        let spec = plain_spec();
        let dt = 0.01;
        let mut t = build(&spec, dt, 1);
        t.set_target(&[[0.9, 0.9]]);
        let target = t.targets()[0][0];
        let ratio = 1.0 - dt / spec.time_constant;
        for k in 1..=20 {
            t.step();
            let err = (t.thruster_forces()[0][0] - target).abs();
            let expected = target.abs() * ratio.powi(k);
            assert!(
                (err - expected).abs() < 1e-3 * target.abs(),
                "step {k}: err {err}, expected {expected}"
            );
        }
    }

    #[test]
    fn large_dt_never_overshoots() {
        let mut t = build(&plain_spec(), 0.5, 1);
        t.set_target(&[[0.7, -0.7]]);
        t.step();
        assert_eq!(t.thruster_forces()[0], t.targets()[0]);
        t.step();
        assert_eq!(t.thruster_forces()[0], t.targets()[0]);
    }

    #[test]
    fn reset_zeroes_force_of_selected_envs() {
        let mut t = build(&plain_spec(), 0.02, 3);
        t.set_target(&[[0.8, 0.8]; 3]);
        for _ in 0..5 {
            t.step();
        }
        t.reset(&EnvIds::new([0, 2], 3));
        assert_eq!(t.thruster_forces()[0], [0.0, 0.0]);
        assert_eq!(t.thruster_forces()[2], [0.0, 0.0]);
        assert_eq!(t.targets()[0], [0.0, 0.0]);
        assert!(t.thruster_forces()[1][0] > 0.0);
    }

    #[test]
    fn split_thrust_halves_each_target() {
        let mut spec = plain_spec();
        let mut full = build(&spec, 0.02, 1);
        spec.split_thrust = true;
        let mut split = build(&spec, 0.02, 1);
        full.set_target(&[[0.6, -0.4]]);
        split.set_target(&[[0.6, -0.4]]);
        for k in 0..NUM_THRUSTERS {
            assert!((split.targets()[0][k] * 2.0 - full.targets()[0][k]).abs() < 1e-5);
        }
    }

    #[test]
    fn differential_thrust_yaws_and_equal_thrust_does_not() {
        let mut t = build(&plain_spec(), 1.0, 2);
        t.set_target(&[[0.5, 0.5], [0.5, -0.5]]);
        let out = t.step();
        assert!(out[0][0] > 0.0);
        assert!(out[0][5].abs() < 1e-5, "{:?}", out[0]);
        // Port thruster forward, starboard reversed: clockwise seen from above.
        assert!(out[1][5] < 0.0, "{:?}", out[1]);
    }

    #[test]
    fn randomization_stays_within_fraction() {
        let spec = heron_spec().thrusters;
        let mut rngs = EnvRngs::new(16, 42);
        let mut t = Thrusters::new(&spec, 0.01, 16, &mut rngs).unwrap();
        for _ in 0..10 {
            t.reset_thruster_randomization(&EnvIds::all(16), &mut rngs);
            for (g, tau) in t.gains().iter().zip(t.time_constants()) {
                assert!((g[0] - 1.0).abs() <= spec.randomization.left_gain + 1e-6);
                assert!((g[1] - 1.0).abs() <= spec.randomization.right_gain + 1e-6);
                let rel = (tau / spec.time_constant - 1.0).abs();
                assert!(rel <= spec.randomization.time_constant + 1e-5);
            }
        }
    }

    #[test]
    fn non_positive_dt_is_rejected() {
        let mut rngs = EnvRngs::new(1, 0);
        assert!(Thrusters::new(&plain_spec(), 0.0, 1, &mut rngs).is_err());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "one command pair per environment")]
    fn short_command_batch_panics_in_debug() {
        let mut t = build(&plain_spec(), 0.02, 3);
        t.set_target(&[[0.5, 0.5]]);
    }
}
