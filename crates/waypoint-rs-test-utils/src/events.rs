use parking_lot::Mutex;
use waypoint_rs_protocol::{EventSink, SyncEvent};

/// Sink that keeps every emitted event in order.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SyncEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().clone()
    }

    /// Events for which `filter` returns true.
    pub fn matching(&self, filter: impl Fn(&SyncEvent) -> bool) -> Vec<SyncEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| filter(event))
            .cloned()
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: SyncEvent) {
        self.events.lock().push(event);
    }
}
