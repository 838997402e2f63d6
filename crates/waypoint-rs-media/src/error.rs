//! Error types for media staging and upload.

use waypoint_rs_protocol::MediaKind;

/// Errors returned by media sources and object stores.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The uri scheme has no reader on this platform.
    #[error("unsupported media uri: {0}")]
    UnsupportedUri(String),
    /// Owner or record id cannot be used as a path segment.
    #[error("invalid path segment: {0}")]
    InvalidKey(String),
    /// The reader was used after release.
    #[error("media reader already released")]
    Released,
    /// Network or backend failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for MediaError {
    fn from(err: reqwest::Error) -> Self {
        MediaError::Transport(err.to_string())
    }
}

/// A single media upload failed.
#[derive(Debug, thiserror::Error)]
#[error("failed to upload {kind:?} media {local_uri}: {source}")]
pub struct UploadError {
    /// The uri that was being uploaded, unchanged.
    pub local_uri: String,
    pub kind: MediaKind,
    #[source]
    pub source: MediaError,
}
