use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoadTripError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid date '{0}'")]
    InvalidDate(String),

    #[error("malformed export: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, RoadTripError>;
