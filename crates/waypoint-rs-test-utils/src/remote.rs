use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use waypoint_rs_protocol::{Record, sort_newest_first};
use waypoint_rs_store::{RemoteError, RemoteRecordStore, cloud_document, merge_record_document};

/// Failure injected into every call of [`MemoryRemoteStore`] while set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteFailure {
    PermissionDenied,
    Offline,
}

impl RemoteFailure {
    fn to_error(self) -> RemoteError {
        match self {
            RemoteFailure::PermissionDenied => {
                RemoteError::PermissionDenied("missing or insufficient permissions".to_string())
            }
            RemoteFailure::Offline => RemoteError::Transport("network unreachable".to_string()),
        }
    }
}

/// In-memory remote collection with the same merge and pruning rules as the
/// filesystem backend.
#[derive(Default)]
pub struct MemoryRemoteStore {
    documents: Mutex<HashMap<String, BTreeMap<String, Value>>>,
    failure: Mutex<Option<RemoteFailure>>,
    calls: Mutex<usize>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed documents without going through `upsert` checks.
    pub fn with_records(owner: &str, records: &[Record]) -> Self {
        let store = Self::new();
        {
            let mut documents = store.documents.lock();
            let collection = documents.entry(owner.to_string()).or_default();
            for record in records {
                if let Ok(value) = serde_json::to_value(record) {
                    collection.insert(record.id.clone(), value);
                }
            }
        }
        store
    }

    pub fn fail_with(&self, failure: RemoteFailure) {
        *self.failure.lock() = Some(failure);
    }

    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    /// Number of calls made, failed ones included.
    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }

    /// Raw stored document for inspection.
    pub fn document(&self, owner: &str, id: &str) -> Option<Value> {
        self.documents
            .lock()
            .get(owner)
            .and_then(|collection| collection.get(id))
            .cloned()
    }

    fn check(&self) -> Result<(), RemoteError> {
        *self.calls.lock() += 1;
        match *self.failure.lock() {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteRecordStore for MemoryRemoteStore {
    async fn list(&self, owner: &str) -> Result<Vec<Record>, RemoteError> {
        self.check()?;
        let documents = self.documents.lock();
        let mut records = documents
            .get(owner)
            .map(|collection| {
                collection
                    .values()
                    .filter_map(|value| serde_json::from_value::<Record>(value.clone()).ok())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn upsert(&self, owner: &str, record: &Record) -> Result<(), RemoteError> {
        self.check()?;
        let incoming = cloud_document(record)?;
        let mut documents = self.documents.lock();
        let collection = documents.entry(owner.to_string()).or_default();
        match collection.get_mut(&record.id) {
            Some(existing) => merge_record_document(existing, &incoming),
            None => {
                collection.insert(record.id.clone(), incoming);
            }
        }
        Ok(())
    }

    async fn delete(&self, owner: &str, id: &str) -> Result<(), RemoteError> {
        self.check()?;
        if let Some(collection) = self.documents.lock().get_mut(owner) {
            collection.remove(id);
        }
        Ok(())
    }

    async fn delete_all(&self, owner: &str) -> Result<usize, RemoteError> {
        self.check()?;
        Ok(self
            .documents
            .lock()
            .remove(owner)
            .map(|collection| collection.len())
            .unwrap_or(0))
    }
}
