//! Batched surface-vessel dynamics.
//!
//! Every model keeps one slot per parallel environment and mutates its
//! buffers in place. Resets take an [`EnvIds`] set and never touch other
//! slots. Nothing here depends on Bevy ECS; the `sim` crate wires these
//! models into an app.

mod math;
pub use math::{
    heading_of, planar_to_local, quat_from_wxyz, quat_to_euler, quat_to_wxyz, world_to_local,
    wrap_angle, wrench, wrench_add, Quatf, Vec2f, Vec3f, Wrench,
};
mod error;
pub use error::ConfigError;
mod env_ids;
pub use env_ids::{EnvIds, EnvPhase};
mod rng;
pub use rng::EnvRngs;
mod spec;
pub use spec::{
    DragRandomizationSpec, HydrodynamicsSpec, HydrostaticsSpec, InterpolationSpec,
    LeastSquaresSpec, ThrusterRandomizationSpec, ThrusterSpec, VesselSpec, WaterCurrentSpec,
};

pub mod builtins;

pub mod vessel;
pub use vessel::{
    CalibrationCurve, HullGeometry, Hydrodynamics, Hydrostatics, PlanarState, Thrusters,
    VehicleState, NUM_THRUSTERS,
};

pub mod disturbances;
pub use disturbances::{
    Dimensionality, Disturbance, DisturbanceKind, DisturbanceSpec, DisturbancesSpec,
    MassDistribution,
};

pub mod task;
pub use task::{ActionMode, Observation, Task, TaskSpec, OBS_DIM};
