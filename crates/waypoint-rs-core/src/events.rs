//! Event fan-out for orchestrator notifications.

use log::debug;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use waypoint_rs_protocol::{EventSink, Record, SyncEvent};

/// Callback invoked with the full record set after every change.
pub type RecordsListener = Arc<dyn Fn(&[Record]) + Send + Sync>;

/// Broadcast-backed event bus.
#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<SyncEvent>,
}

impl EventBus {
    /// Create a new event bus with the given channel buffer size.
    pub fn new(buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer);
        debug!("event bus initialized (buffer={})", buffer);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }
}

impl EventSink for EventBus {
    fn emit(&self, event: SyncEvent) {
        let _ = self.sender.send(event);
    }
}

/// Delivers every event to the bus, an optional external sink and, for
/// record changes, the registered listeners.
pub(crate) struct Notifier {
    bus: EventBus,
    sink: Option<Arc<dyn EventSink>>,
    listeners: RwLock<Vec<RecordsListener>>,
}

impl Notifier {
    pub(crate) fn new(buffer: usize, sink: Option<Arc<dyn EventSink>>) -> Self {
        Self {
            bus: EventBus::new(buffer),
            sink,
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.bus.subscribe()
    }

    pub(crate) fn add_listener(&self, listener: RecordsListener) {
        self.listeners.write().push(listener);
    }

    pub(crate) fn records_changed(&self, records: &[Record]) {
        let listeners = self.listeners.read().clone();
        for listener in listeners {
            listener(records);
        }
        self.emit(SyncEvent::RecordsChanged {
            records: records.to_vec(),
        });
    }
}

impl EventSink for Notifier {
    fn emit(&self, event: SyncEvent) {
        if let Some(sink) = &self.sink {
            sink.emit(event.clone());
        }
        self.bus.emit(event);
    }
}
