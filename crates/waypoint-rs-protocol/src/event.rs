//! Events emitted by the sync core to presentation layers.

use crate::record::{Record, RecordId};
use serde::{Deserialize, Serialize};

/// Aggregate outcome of a save, surfaced once per save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SaveStatus {
    /// Every media item staged and uploaded.
    Complete,
    /// Saved locally; some media failed to upload and is missing from the
    /// cloud copy. Staging failures are logged, not counted.
    CompletedWithWarnings { failed_media: usize },
    /// Saved locally without an owner; nothing was uploaded.
    LocalOnly,
}

impl SaveStatus {
    pub fn from_failures(failed_media: usize) -> Self {
        if failed_media == 0 {
            SaveStatus::Complete
        } else {
            SaveStatus::CompletedWithWarnings { failed_media }
        }
    }

    pub fn has_warnings(&self) -> bool {
        !matches!(self, SaveStatus::Complete)
    }

    /// Single user-facing summary for the whole batch.
    pub fn message(&self) -> String {
        match self {
            SaveStatus::Complete => "Memory saved.".to_string(),
            SaveStatus::CompletedWithWarnings { failed_media: 1 } => {
                "Memory saved, but 1 media item could not be uploaded.".to_string()
            }
            SaveStatus::CompletedWithWarnings { failed_media } => {
                format!("Memory saved, but {failed_media} media items could not be uploaded.")
            }
            SaveStatus::LocalOnly => {
                "Memory saved on this device. Sign in to sync it.".to_string()
            }
        }
    }
}

/// Remote operation kinds reported in failure events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteOperation {
    List,
    Upsert,
    Delete,
    DeleteAll,
}

/// Events emitted by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "payload")]
pub enum SyncEvent {
    /// The local record set changed; carries the full set, newest first.
    RecordsChanged { records: Vec<Record> },
    /// A save reached local commit.
    SaveCommitted {
        record_id: RecordId,
        status: SaveStatus,
    },
    /// A best-effort remote write failed; local state is unaffected.
    CloudSyncFailed {
        record_id: Option<RecordId>,
        operation: RemoteOperation,
        message: String,
    },
    /// The remote store refused access. Emitted at most once per orchestrator.
    CloudUnavailable { reason: String },
}

/// Event sink for orchestrator notifications.
pub trait EventSink: Send + Sync {
    /// Emit an event to downstream listeners.
    fn emit(&self, event: SyncEvent);
}
