use thiserror::Error;

#[derive(Error, Debug)]
pub enum LubeLoggerError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned HTTP {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("empty response from {endpoint} with status {status}")]
    EmptyResponse { endpoint: String, status: u16 },

    #[error("unmarshalling json: {source} (body: {body})")]
    JsonError {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("invalid {field} value '{value}'")]
    InvalidField { field: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, LubeLoggerError>;
