//! Minimal rigid-body host standing in for a physics engine.

use bevy::math::Mat3;
use physics::{HullGeometry, Quatf, VehicleState, Vec3f, Wrench};

/// Box hull height used only for the inertia estimate (m).
const HULL_HEIGHT: f32 = 0.3;

/// Semi-implicit Euler integration of `N` hulls under gravity and the
/// wrenches produced by the dynamics models.
#[derive(Debug, Clone)]
pub struct Bodies {
    pub states: Vec<VehicleState>,
    mass: Vec<f32>,
    com: Vec<Vec3f>,
    inertia: Vec<Vec3f>,
    gravity: f32,
    hull: HullGeometry,
}

impl Bodies {
    pub fn new(num_envs: usize, mass: f32, gravity: f32, hull: HullGeometry) -> Self {
        let mut this = Self {
            states: vec![VehicleState::default(); num_envs],
            mass: vec![mass; num_envs],
            com: vec![Vec3f::ZERO; num_envs],
            inertia: vec![Vec3f::ONE; num_envs],
            gravity,
            hull,
        };
        for i in 0..num_envs {
            this.set_mass(i, mass, Vec3f::ZERO);
        }
        this
    }

    pub fn mass(&self, env: usize) -> f32 {
        self.mass[env]
    }

    /// Mass (kg) and body-frame centre-of-mass offset of one hull.
    pub fn set_mass(&mut self, env: usize, mass: f32, com: Vec3f) {
        let (w, l, h) = (self.hull.width, self.hull.length, HULL_HEIGHT);
        self.mass[env] = mass;
        self.com[env] = com;
        self.inertia[env] = Vec3f::new(
            mass / 12.0 * (w * w + h * h),
            mass / 12.0 * (l * l + h * h),
            mass / 12.0 * (w * w + l * l),
        );
    }

    pub fn set_state(&mut self, env: usize, state: VehicleState) {
        self.states[env] = state;
    }

    pub fn orientations(&self) -> Vec<Quatf> {
        self.states.iter().map(|s| s.orientation).collect()
    }

    pub fn positions(&self) -> Vec<Vec3f> {
        self.states.iter().map(|s| s.position).collect()
    }

    pub fn twists(&self) -> Vec<[f32; 6]> {
        self.states.iter().map(VehicleState::twist).collect()
    }

    /// Advance every hull by `dt`. `body_wrench` is in the body frame,
    /// `world_force` and `world_torque` in the world frame.
    pub fn integrate(
        &mut self,
        body_wrench: &[Wrench],
        world_force: &[Vec3f],
        world_torque: &[Vec3f],
        dt: f32,
    ) {
        for (i, s) in self.states.iter_mut().enumerate() {
            let rot = Mat3::from_quat(s.orientation);
            let w = &body_wrench[i];
            let weight = Vec3f::new(0.0, 0.0, self.mass[i] * self.gravity);
            let force = rot * Vec3f::new(w[0], w[1], w[2]) + world_force[i] + weight;
            // Weight acting off the geometric centre heels the hull.
            let torque_world = rot * Vec3f::new(w[3], w[4], w[5])
                + world_torque[i]
                + (rot * self.com[i]).cross(weight);

            s.linear_velocity += force / self.mass[i] * dt;
            s.position += s.linear_velocity * dt;

            let inertia = self.inertia[i];
            let omega_b = rot.transpose() * s.angular_velocity;
            let torque_b = rot.transpose() * torque_world;
            let gyro = omega_b.cross(inertia * omega_b);
            let omega_b = omega_b + (torque_b - gyro) / inertia * dt;
            s.angular_velocity = rot * omega_b;
            s.orientation = (Quatf::from_scaled_axis(s.angular_velocity * dt) * s.orientation)
                .normalize();
        }
    }
}
