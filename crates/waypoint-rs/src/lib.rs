//! Public SDK surface for Waypoint.
//!
//! This crate re-exports the building blocks and wires them from a
//! [`WaypointConfig`](config::WaypointConfig) into a ready orchestrator.

mod app;

pub use app::{Waypoint, WaypointError, WaypointOptions};

/// Re-export for convenience.
pub use waypoint_rs_config as config;
pub use waypoint_rs_core as core;
/// Re-export for convenience.
pub use waypoint_rs_media as media;
pub use waypoint_rs_protocol as protocol;
/// Re-export for convenience.
pub use waypoint_rs_store as store;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::builder()
            .format_timestamp_millis()
            .parse_default_env()
            .try_init();
    }
}
