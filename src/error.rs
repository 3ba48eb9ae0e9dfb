//! Error types for the Paddock CLI

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for Paddock operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    /// Request parameters do not name a loadable session
    #[error("Invalid session: {0}")]
    InvalidSession(String),

    /// Upstream data is too sparse to build lap records
    #[error("Data unavailable for this session: {0}")]
    UnsupportedSession(String),

    /// Upstream fetch failed and no usable cached copy exists
    #[error("Session data is currently unavailable ({0}). Try again later.")]
    DataUnavailable(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Upstream timing API errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to timing API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Local cache faults. Absorbed by the session loader and never shown to users
/// except through the `cache` subcommands.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Could not determine cache directory")]
    NoHome,

    #[error("Failed to read cache entry {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to write cache entry {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("Cache I/O error: {0}")]
    Io(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Timing API host not configured. Set PADDOCK_API_HOST or api_host in the config file.")]
    MissingApiHost,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
