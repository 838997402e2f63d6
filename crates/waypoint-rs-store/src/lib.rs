//! Local and remote persistence for Waypoint records.

pub mod document;
pub mod error;
pub mod export;
pub mod local;
pub mod remote;

/// Store error types.
pub use error::{RemoteError, StoreError};
/// Cloud document helpers.
pub use document::{
    LEGACY_MEDIA_KEYS, cloud_document, merge_document, merge_record_document, prune_absent,
};
/// JSON export of the local record set.
pub use export::{export_file_name, export_json};
/// Local record set persistence.
pub use local::{FileRecordStore, LocalRecordStore};
/// Per-owner remote document collection.
pub use remote::{FsRemoteRecordStore, RemoteRecordStore};
