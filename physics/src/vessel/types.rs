use crate::math::heading_of;
use crate::spec::HydrostaticsSpec;
use crate::{Quatf, Vec2f, Vec3f};

/// Snapshot of one rigid body as reported by the physics host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub position: Vec3f,
    /// Body→world. Body axes: +X forward, +Y left (port), +Z up.
    pub orientation: Quatf,
    /// World frame (m/s).
    pub linear_velocity: Vec3f,
    /// World frame (rad/s).
    pub angular_velocity: Vec3f,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            position: Vec3f::ZERO,
            orientation: Quatf::IDENTITY,
            linear_velocity: Vec3f::ZERO,
            angular_velocity: Vec3f::ZERO,
        }
    }
}

impl VehicleState {
    /// World-frame twist as `[vx, vy, vz, wx, wy, wz]`.
    pub fn twist(&self) -> [f32; 6] {
        let v = self.linear_velocity;
        let w = self.angular_velocity;
        [v.x, v.y, v.z, w.x, w.y, w.z]
    }

    pub fn planar(&self) -> PlanarState {
        PlanarState {
            position: self.position.truncate(),
            heading: heading_of(self.orientation),
            linear_velocity: self.linear_velocity.truncate(),
            angular_velocity: self.angular_velocity.z,
        }
    }
}

/// Yaw-plane projection of a [`VehicleState`], the view tasks work with.
/// Position is relative to the environment origin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlanarState {
    pub position: Vec2f,
    pub heading: f32,
    pub linear_velocity: Vec2f,
    pub angular_velocity: f32,
}

/// Box approximation of the hull used to derive submerged volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullGeometry {
    pub width: f32,
    pub length: f32,
    pub waterplane_area: f32,
    pub zero_height: f32,
    pub max_draft: f32,
}

impl HullGeometry {
    pub fn from_spec(spec: &HydrostaticsSpec) -> Self {
        Self {
            width: spec.box_width,
            length: spec.box_length,
            waterplane_area: spec.waterplane_area,
            zero_height: spec.zero_height,
            max_draft: spec.max_draft,
        }
    }

    pub fn max_volume(&self) -> f32 {
        self.width * self.length * (self.zero_height + self.max_draft)
    }

    /// Depth of hull below the waterline for a body at height `z`.
    pub fn submerged_height(&self, z: f32) -> f32 {
        (self.zero_height - z).clamp(0.0, self.zero_height + self.max_draft)
    }

    /// Always within `[0, max_volume]`.
    pub fn submerged_volume(&self, z: f32) -> f32 {
        (self.submerged_height(z) * self.waterplane_area).clamp(0.0, self.max_volume())
    }

    /// Height at which buoyancy balances `mass` in water of `density`.
    pub fn equilibrium_height(&self, mass: f32, density: f32) -> f32 {
        self.zero_height - mass / (self.waterplane_area * density)
    }
}
