use lubelogger::LubeLoggerError;
use roadtrip::RoadTripError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("loading gas records for vehicle {vehicle_id}: {source}")]
    Load {
        vehicle_id: i64,
        #[source]
        source: LubeLoggerError,
    },

    #[error("invalid odometer value {0}")]
    InvalidOdometer(f64),

    #[error("invalid destination record: {0}")]
    Destination(#[from] LubeLoggerError),

    #[error("invalid source record: {0}")]
    Source(#[from] RoadTripError),

    #[error("inserting gas record: {0}")]
    Insert(#[source] LubeLoggerError),

    #[error("gas record rejected: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
