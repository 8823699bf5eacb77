mod types;
mod hydrostatics;
mod hydrodynamics;
mod thrusters;

pub use types::{HullGeometry, PlanarState, VehicleState};
pub use hydrostatics::Hydrostatics;
pub use hydrodynamics::Hydrodynamics;
pub use thrusters::{CalibrationCurve, Thrusters, NUM_THRUSTERS};
