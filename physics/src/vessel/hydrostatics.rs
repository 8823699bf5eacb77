use crate::error::ConfigError;
use crate::math::{quat_to_euler, wrench, world_to_local, Wrench};
use crate::spec::HydrostaticsSpec;
use crate::vessel::{HullGeometry, VehicleState};
use crate::{Quatf, Vec3f};

/// Buoyancy and metacentric righting moment for `N` hulls.
///
/// Following Fossen's small-angle treatment: the buoyant force is
/// `-rho * g * V` along world Z and the righting moment is the metacentric arm
/// times the sine of the heel angle times a force magnitude.
#[derive(Debug, Clone)]
pub struct Hydrostatics {
    water_density: f32,
    gravity: f32,
    metacentric_width: f32,
    metacentric_length: f32,
    average_force: f32,
    amplify_torque: f32,
    rotate_torque: bool,
    hull: HullGeometry,
    submerged: Vec<f32>,
    rpy: Vec<Vec3f>,
    force_global: Vec<Vec3f>,
    torque_global: Vec<Vec3f>,
    out: Vec<Wrench>,
}

impl Hydrostatics {
    pub fn new(spec: &HydrostaticsSpec, num_envs: usize) -> Result<Self, ConfigError> {
        spec.validate()?;
        Ok(Self {
            water_density: spec.water_density,
            gravity: spec.gravity,
            metacentric_width: spec.metacentric_width.unwrap_or(spec.box_width * 0.5),
            metacentric_length: spec.metacentric_length.unwrap_or(spec.box_length * 0.5),
            average_force: spec.average_hydrostatics_force_value,
            amplify_torque: spec.amplify_torque,
            rotate_torque: spec.rotate_torque_to_body,
            hull: HullGeometry::from_spec(spec),
            submerged: vec![0.0; num_envs],
            rpy: vec![Vec3f::ZERO; num_envs],
            force_global: vec![Vec3f::ZERO; num_envs],
            torque_global: vec![Vec3f::ZERO; num_envs],
            out: vec![[0.0; 6]; num_envs],
        })
    }

    pub fn hull(&self) -> &HullGeometry {
        &self.hull
    }

    pub fn water_density(&self) -> f32 {
        self.water_density
    }

    /// Submerged volume per environment from the latest `update_from_states`.
    pub fn submerged_volume(&self) -> &[f32] {
        &self.submerged
    }

    /// Roll, pitch, yaw per environment from the latest `update_from_states`.
    pub fn euler_angles(&self) -> &[Vec3f] {
        &self.rpy
    }

    /// Derive submerged volume and Euler angles from host state, then compute
    /// the body-frame restoring wrench.
    pub fn update_from_states(&mut self, states: &[VehicleState]) -> &[Wrench] {
        debug_assert_eq!(states.len(), self.out.len());
        for (i, s) in states.iter().enumerate() {
            self.submerged[i] = self.hull.submerged_volume(s.position.z);
            self.rpy[i] = quat_to_euler(s.orientation);
        }
        self.fill_global();
        for (i, s) in states.iter().enumerate() {
            self.out[i] = self.localize(i, s.orientation);
        }
        &self.out
    }

    /// World-frame buoyant force and righting torque.
    pub fn compute_global(&mut self, submerged_volume: &[f32], rpy: &[Vec3f]) -> (&[Vec3f], &[Vec3f]) {
        debug_assert_eq!(submerged_volume.len(), self.out.len());
        self.submerged.copy_from_slice(submerged_volume);
        self.rpy.copy_from_slice(rpy);
        self.fill_global();
        (&self.force_global, &self.torque_global)
    }

    /// Body-frame `[force, torque * amplify_torque]` per environment.
    pub fn compute_restoring_force(
        &mut self,
        submerged_volume: &[f32],
        rpy: &[Vec3f],
        orientations: &[Quatf],
    ) -> &[Wrench] {
        self.compute_global(submerged_volume, rpy);
        for (i, q) in orientations.iter().enumerate() {
            self.out[i] = self.localize(i, *q);
        }
        &self.out
    }

    fn fill_global(&mut self) {
        for i in 0..self.out.len() {
            let (roll, pitch) = (self.rpy[i].x, self.rpy[i].y);
            let fz = -self.water_density * self.gravity * self.submerged[i];
            self.force_global[i] = Vec3f::new(0.0, 0.0, fz);
            // Uses the configured average force, not `fz`: the live force
            // oscillates with the host tick rate and makes the torque unstable.
            self.torque_global[i] = Vec3f::new(
                -self.metacentric_width * roll.sin() * self.average_force,
                -self.metacentric_length * pitch.sin() * self.average_force,
                0.0,
            );
        }
    }

    fn localize(&self, i: usize, orientation: Quatf) -> Wrench {
        let r = world_to_local(orientation);
        let force = r * self.force_global[i];
        let torque = if self.rotate_torque {
            r * self.torque_global[i]
        } else {
            self.torque_global[i]
        };
        wrench(force, torque * self.amplify_torque)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::heron_spec;

    fn spec_with(density: f32, gravity: f32) -> HydrostaticsSpec {
        let mut s = heron_spec().hydrostatics;
        s.water_density = density;
        s.gravity = gravity;
        s
    }

    #[test]
    fn buoyancy_scenario() {
        let mut h = Hydrostatics::new(&spec_with(1000.0, 9.81), 3).unwrap();
        let (force, _) = h.compute_global(&[0.0, 0.5, 1.0], &[Vec3f::ZERO; 3]);
        let fz: Vec<f32> = force.iter().map(|f| f.z).collect();
        for (got, want) in fz.iter().zip([0.0, -4905.0, -9810.0]) {
            assert!((got - want).abs() < 1e-2, "fz={got}, expected {want}");
        }
    }

    #[test]
    fn buoyancy_monotone_and_non_positive() {
        let spec = spec_with(1000.0, 9.81);
        let max_v = HullGeometry::from_spec(&spec).max_volume();
        let n = 64;
        let vols: Vec<f32> = (0..n).map(|k| max_v * k as f32 / (n - 1) as f32).collect();
        let mut h = Hydrostatics::new(&spec, n).unwrap();
        let (force, _) = h.compute_global(&vols, &vec![Vec3f::ZERO; n]);
        let mut prev = 0.0f32;
        for f in force {
            assert!(f.z <= 0.0, "vertical component must be non-positive: {}", f.z);
            assert!(f.z.abs() >= prev, "magnitude must not decrease");
            prev = f.z.abs();
            assert_eq!(f.x, 0.0);
            assert_eq!(f.y, 0.0);
        }
    }

    #[test]
    fn upright_has_no_righting_torque() {
        let mut h = Hydrostatics::new(&heron_spec().hydrostatics, 2).unwrap();
        let out = h.compute_restoring_force(&[0.03, 0.05], &[Vec3f::ZERO; 2], &[Quatf::IDENTITY; 2]);
        for w in out {
            assert_eq!(&w[3..], &[0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn righting_torque_opposes_heel() {
        let mut h = Hydrostatics::new(&heron_spec().hydrostatics, 4).unwrap();
        let rpy = [
            Vec3f::new(0.1, 0.0, 0.0),
            Vec3f::new(-0.1, 0.0, 0.0),
            Vec3f::new(0.0, 0.08, 0.0),
            Vec3f::new(0.0, -0.08, 0.0),
        ];
        let (_, torque) = h.compute_global(&[0.03; 4], &rpy);
        assert!(torque[0].x < 0.0 && torque[1].x > 0.0, "roll torque {:?}", &torque[..2]);
        assert!(torque[2].y < 0.0 && torque[3].y > 0.0, "pitch torque {:?}", &torque[2..]);
    }

    #[test]
    fn torque_ignores_live_buoyancy() {
        let mut h = Hydrostatics::new(&heron_spec().hydrostatics, 2).unwrap();
        let rpy = [Vec3f::new(0.2, 0.0, 0.0); 2];
        let (_, torque) = h.compute_global(&[0.01, 0.2], &rpy);
        assert_eq!(torque[0], torque[1]);
    }

    #[test]
    fn force_is_rotated_but_torque_is_not_by_default() {
        let spec = heron_spec().hydrostatics;
        let mut h = Hydrostatics::new(&spec, 1).unwrap();
        let roll = 0.3;
        let q = Quatf::from_rotation_x(roll);
        let rpy = [Vec3f::new(roll, 0.0, 0.0)];
        let out = h.compute_restoring_force(&[0.04], &rpy, &[q])[0];
        let fz_global = -spec.water_density * spec.gravity * 0.04;
        // World +Z expressed in a body rolled by +roll.
        assert!((out[1] - fz_global * roll.sin()).abs() < 1e-3, "fy={}", out[1]);
        assert!((out[2] - fz_global * roll.cos()).abs() < 1e-3, "fz={}", out[2]);
        let expected_tx = -0.5 * spec.box_width * roll.sin() * spec.average_hydrostatics_force_value;
        assert!((out[3] - expected_tx * spec.amplify_torque).abs() < 1e-4);
        assert_eq!(out[4], 0.0);
        assert_eq!(out[5], 0.0);
    }

    #[test]
    fn torque_rotation_can_be_enabled() {
        let mut spec = heron_spec().hydrostatics;
        spec.rotate_torque_to_body = true;
        let mut h = Hydrostatics::new(&spec, 1).unwrap();
        let q = Quatf::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let out = h.compute_restoring_force(&[0.04], &[Vec3f::new(0.2, 0.0, 0.0)], &[q])[0];
        // Global roll torque about X becomes a torque about body -Y after a 90° yaw.
        assert!(out[3].abs() < 1e-4);
        assert!(out[4] > 0.0, "{out:?}");
    }

    #[test]
    fn amplify_scales_torque_only() {
        let mut spec = heron_spec().hydrostatics;
        let rpy = [Vec3f::new(0.1, 0.05, 0.0)];
        let base = Hydrostatics::new(&spec, 1).unwrap().compute_restoring_force(&[0.04], &rpy, &[Quatf::IDENTITY])[0];
        spec.amplify_torque = 3.0;
        let amp = Hydrostatics::new(&spec, 1).unwrap().compute_restoring_force(&[0.04], &rpy, &[Quatf::IDENTITY])[0];
        assert_eq!(&base[..3], &amp[..3]);
        for k in 3..5 {
            assert!((amp[k] - 3.0 * base[k]).abs() < 1e-5);
        }
    }
}
