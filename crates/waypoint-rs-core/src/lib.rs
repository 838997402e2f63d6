//! Sync core for Waypoint.
//!
//! Owns the single-writer record set and sequences media staging, uploads,
//! local commits and remote reconciliation.

pub mod error;
pub mod events;
pub mod identity;
pub mod orchestrator;
pub mod reconciler;

pub use error::SyncError;
pub use events::{EventBus, RecordsListener};
pub use identity::{IdentityProvider, SharedIdentity};
pub use orchestrator::{
    CloudBackend, DeleteAllReport, LOCAL_OWNER, RemoteOutcome, RemoteSync, RemoteTask,
    SaveReceipt, SyncOrchestrator, SyncOrchestratorBuilder,
};
pub use reconciler::{Reconciler, merge};
/// Event sink trait shared with the protocol crate.
pub use waypoint_rs_protocol::EventSink;
