//! Reverse geocoding collaborator.

use crate::record::Location;
use async_trait::async_trait;

/// Resolves a human-readable place name for a coordinate.
///
/// The core only stores whatever name it is given; a lookup that fails or
/// finds nothing returns `None`.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn location_name(&self, location: Location) -> Option<String>;
}
