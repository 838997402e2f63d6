//! Error types for the sync core.

use thiserror::Error;
use waypoint_rs_protocol::Location;
use waypoint_rs_store::StoreError;

/// Errors returned by orchestrator operations.
///
/// Only local failures surface here; remote failures are reported through
/// events and never fail a user-facing operation.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The local record set could not be written.
    #[error("local store error: {0}")]
    Store(#[from] StoreError),
    /// The draft's coordinate cannot be persisted.
    #[error("invalid location (latitude={}, longitude={})", .0.latitude, .0.longitude)]
    InvalidLocation(Location),
    /// A background remote task panicked or was cancelled.
    #[error("remote task error: {0}")]
    Task(String),
}
