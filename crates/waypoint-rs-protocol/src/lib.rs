//! Shared record model and event types for Waypoint.
//!
//! Every crate in the workspace speaks in terms of the canonical [`Record`].
//! Legacy persisted shapes are normalized on deserialization, so business
//! logic never inspects ad hoc field presence.

mod event;
mod geocode;
mod legacy;
mod record;
mod sort;

pub use event::{EventSink, RemoteOperation, SaveStatus, SyncEvent};
pub use geocode::Geocoder;
pub use record::{
    Draft, Location, MediaItem, MediaKind, OwnerId, Record, RecordAttributes, RecordId,
    RecordKind, is_remote_uri,
};
pub use sort::{SortOrder, sort_newest_first, sort_records};
