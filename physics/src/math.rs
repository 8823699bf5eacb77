use bevy_math::{Mat3, Quat, Vec2, Vec3};

pub type Vec3f = Vec3;
pub type Vec2f = Vec2;
pub type Quatf = Quat;

/// Force (xyz) followed by torque (xyz).
pub type Wrench = [f32; 6];

/// Build a quaternion from simulator `(w, x, y, z)` order.
#[inline]
pub fn quat_from_wxyz(q: [f32; 4]) -> Quatf {
    Quat::from_xyzw(q[1], q[2], q[3], q[0])
}

#[inline]
pub fn quat_to_wxyz(q: Quatf) -> [f32; 4] {
    [q.w, q.x, q.y, q.z]
}

/// Roll, pitch and yaw (x-y-z convention) of a body→world quaternion.
///
/// The pitch term goes through `asin`; floating point drift on a nearly
/// vertical attitude pushes its argument slightly outside `[-1, 1]`, so it is
/// clamped before the call.
pub fn quat_to_euler(q: Quatf) -> Vec3f {
    let (w, x, y, z) = (q.w, q.x, q.y, q.z);
    let r00 = 1.0 - 2.0 * (y * y + z * z);
    let r10 = 2.0 * (x * y + w * z);
    let r20 = 2.0 * (x * z - w * y);
    let r21 = 2.0 * (y * z + w * x);
    let r22 = 1.0 - 2.0 * (x * x + y * y);
    let roll = r21.atan2(r22);
    let pitch = (-r20).clamp(-1.0, 1.0).asin();
    let yaw = r10.atan2(r00);
    Vec3f::new(roll, pitch, yaw)
}

/// Heading (yaw about +Z) of a body→world quaternion.
#[inline]
pub fn heading_of(q: Quatf) -> f32 {
    let siny_cosp = 2.0 * (q.w * q.z + q.x * q.y);
    let cosy_cosp = 1.0 - 2.0 * (q.y * q.y + q.z * q.z);
    siny_cosp.atan2(cosy_cosp)
}

/// Rotation taking world-frame vectors into the body frame.
#[inline]
pub fn world_to_local(q: Quatf) -> Mat3 {
    Mat3::from_quat(q).transpose()
}

/// Rotate a planar vector by `-heading` (world → body for yaw-only frames).
#[inline]
pub fn planar_to_local(v: Vec2f, heading: f32) -> Vec2f {
    let (s, c) = heading.sin_cos();
    Vec2f::new(c * v.x + s * v.y, -s * v.x + c * v.y)
}

/// Wrap an angle into `(-π, π]`.
#[inline]
pub fn wrap_angle(a: f32) -> f32 {
    let w = (a + std::f32::consts::PI).rem_euclid(std::f32::consts::TAU) - std::f32::consts::PI;
    if w <= -std::f32::consts::PI {
        w + std::f32::consts::TAU
    } else {
        w
    }
}

#[inline]
pub fn wrench(force: Vec3f, torque: Vec3f) -> Wrench {
    [force.x, force.y, force.z, torque.x, torque.y, torque.z]
}

#[inline]
pub fn wrench_add(a: Wrench, b: Wrench) -> Wrench {
    let mut out = a;
    for (o, v) in out.iter_mut().zip(b) {
        *o += v;
    }
    out
}
