//! Handles for best-effort remote work.

use crate::error::SyncError;
use std::future::Future;
use tokio::task::JoinHandle;

/// How a background remote write ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// The remote store accepted the write.
    Committed,
    /// No remote write was attempted (signed out or no cloud backend).
    Skipped,
    /// The write failed; the failure was already logged and emitted.
    Failed(String),
}

/// Join point for a remote write running after local commit.
///
/// Dropping the handle leaves the write running.
#[derive(Debug)]
pub struct RemoteTask {
    handle: Option<JoinHandle<RemoteOutcome>>,
}

impl RemoteTask {
    pub(crate) fn skipped() -> Self {
        Self { handle: None }
    }

    pub(crate) fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = RemoteOutcome> + Send + 'static,
    {
        Self {
            handle: Some(tokio::spawn(future)),
        }
    }

    /// Wait for the remote write to settle.
    pub async fn wait(self) -> Result<RemoteOutcome, SyncError> {
        match self.handle {
            Some(handle) => handle
                .await
                .map_err(|err| SyncError::Task(err.to_string())),
            None => Ok(RemoteOutcome::Skipped),
        }
    }
}
