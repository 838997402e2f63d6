//! Test helpers shared across Waypoint crates.

pub mod events;
pub mod geocoder;
pub mod objects;
pub mod remote;

pub use events::RecordingSink;
pub use geocoder::StubGeocoder;
pub use objects::FlakyObjectStore;
pub use remote::{MemoryRemoteStore, RemoteFailure};
