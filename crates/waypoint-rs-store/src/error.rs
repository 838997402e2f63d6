//! Error types for record persistence.

/// Errors returned by the local record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Export requested for an empty record set.
    #[error("no records to export")]
    NothingToExport,
}

/// Errors returned by remote record stores.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The owner is not allowed to access the collection.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// A cloud write carried a device-local media uri.
    #[error("record {record_id} references local media: {uri}")]
    LocalMediaRejected { record_id: String, uri: String },
    /// Owner or record id cannot be used as a document key.
    #[error("invalid document key: {0}")]
    InvalidKey(String),
    /// Network or backend failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// IO error.
    #[error("io error: {0}")]
    Io(std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl RemoteError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, RemoteError::PermissionDenied(_))
    }
}

impl From<std::io::Error> for RemoteError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            RemoteError::PermissionDenied(err.to_string())
        } else {
            RemoteError::Io(err)
        }
    }
}
