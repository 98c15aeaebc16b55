pub mod error;
pub mod loader;
pub mod models;

pub use crate::error::{Result, RoadTripError};
pub use crate::loader::{load_vehicle, parse_export};
pub use crate::models::{FuelRecord, RoadTripDate, RoadTripVehicle};
