//! Config error type.

use thiserror::Error;

/// Errors returned while loading or validating a Waypoint config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] json5::Error),
    #[error("failed to decode config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// A field is present but has the wrong shape or value.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// A field required by another setting is absent.
    #[error("missing config field {path}: {reason}")]
    MissingField { path: String, reason: String },
}
