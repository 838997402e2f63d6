use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;
use waypoint_rs_protocol::{Geocoder, Location};

/// Geocoder answering every lookup with the same name, or with nothing.
#[derive(Default)]
pub struct StubGeocoder {
    name: Option<String>,
    calls: AtomicUsize,
    /// When set, lookups wait here until [`StubGeocoder::release`].
    gate: Option<Semaphore>,
}

impl StubGeocoder {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Like [`StubGeocoder::named`], but every lookup blocks until released.
    pub fn gated(name: impl Into<String>) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::named(name)
        }
    }

    /// Let every pending and future lookup finish.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn location_name(&self, _location: Location) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await;
        }
        self.name.clone()
    }
}
