//! LubeLogger API client.
//!
//! Provides the vehicle and gas record DTOs, their wire encodings, and an async client
//! behind the [`LubeLoggerApi`] trait so callers can substitute their own implementation.

pub mod client;
pub mod error;
pub mod models;
pub mod wire;

pub use crate::client::{ApiConfig, LubeLoggerApi, LubeLoggerClient};
pub use crate::error::{LubeLoggerError, Result};
pub use crate::models::{ExtraField, GasRecord, PostResponse, Vehicle};
