//! Reconciles Road Trip fuel records against LubeLogger gas records.
//!
//! - [`comparator`] derives the identity key of a fillup from either side.
//! - [`index`] answers "is this key already in LubeLogger?" for one vehicle.
//! - [`transform`] turns a Road Trip row into a LubeLogger gas record.
//! - [`engine`] classifies, queues and inserts, stopping a batch on its first failure.

pub mod comparator;
pub mod engine;
pub mod error;
pub mod index;
pub mod transform;

pub use crate::comparator::{odometer_key, ComparatorKey, Fillup, MatchStrategy};
pub use crate::engine::{plan_inserts, Classification, InsertPlan, Reconciler, SyncReport};
pub use crate::error::{Result, SyncError};
pub use crate::index::{GasRecordIndex, Lookup};
pub use crate::transform::to_gas_record;
