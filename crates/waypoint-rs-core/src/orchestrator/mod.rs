//! Sync orchestrator: sequences staging, upload, local commit and remote
//! reconciliation over a single-writer record set.

mod save;
mod task;

pub use save::SaveReceipt;
pub use task::{RemoteOutcome, RemoteTask};

use crate::error::SyncError;
use crate::events::{Notifier, RecordsListener};
use crate::identity::IdentityProvider;
use crate::reconciler::Reconciler;
use chrono::NaiveDate;
use futures_util::future::join_all;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use waypoint_rs_media::{MediaStager, RemoteUploader};
use waypoint_rs_protocol::{
    EventSink, Geocoder, Location, MediaItem, Record, RecordId, RemoteOperation, SortOrder, SyncEvent,
    sort_newest_first, sort_records,
};
use waypoint_rs_store::{LocalRecordStore, RemoteError, RemoteRecordStore, export_json};

/// Owner used for staging while nobody is signed in.
pub const LOCAL_OWNER: &str = "local";
const DEFAULT_EVENT_BUFFER: usize = 256;

/// Remote record collection plus the uploader feeding it media.
#[derive(Clone)]
pub struct CloudBackend {
    pub records: Arc<dyn RemoteRecordStore>,
    pub uploader: RemoteUploader,
}

/// Result of a remote fetch-and-reconcile attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteSync {
    /// Remote records were merged into the local set.
    Reconciled { remote: usize, total: usize },
    /// No owner is signed in.
    SignedOut,
    /// No cloud backend is configured.
    Disabled,
    /// The remote list failed; local data stays authoritative.
    Unavailable,
}

/// Counts reported by [`SyncOrchestrator::delete_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteAllReport {
    pub local_removed: usize,
    /// `None` when signed out, no cloud backend, or the remote call failed.
    pub remote_removed: Option<usize>,
}

struct Inner {
    local: Arc<dyn LocalRecordStore>,
    reconciler: Reconciler,
    stager: MediaStager,
    cloud: Option<CloudBackend>,
    identity: Arc<dyn IdentityProvider>,
    geocoder: Option<Arc<dyn Geocoder>>,
    notifier: Notifier,
    /// The record set; every read-modify-write holds this lock throughout.
    records: Mutex<Vec<Record>>,
    permission_reported: AtomicBool,
}

impl Inner {
    fn owner_and_cloud(&self) -> Option<(String, CloudBackend)> {
        let cloud = self.cloud.clone()?;
        let owner = self.identity.current_owner()?;
        Some((owner, cloud))
    }

    /// Log and emit a remote failure. Permission denial is reported once.
    fn report_remote_failure(
        &self,
        record_id: Option<&str>,
        operation: RemoteOperation,
        err: &RemoteError,
    ) {
        if err.is_permission_denied() {
            if self.permission_reported.swap(true, Ordering::SeqCst) {
                debug!("remote access still denied (operation={:?})", operation);
            } else {
                warn!("remote access denied, continuing local-only: {}", err);
                self.notifier.emit(SyncEvent::CloudUnavailable {
                    reason: err.to_string(),
                });
            }
            return;
        }
        warn!(
            "remote {:?} failed (record_id={}): {}",
            operation,
            record_id.unwrap_or("-"),
            err
        );
        self.notifier.emit(SyncEvent::CloudSyncFailed {
            record_id: record_id.map(str::to_string),
            operation,
            message: err.to_string(),
        });
    }
}

/// Builder for [`SyncOrchestrator`].
pub struct SyncOrchestratorBuilder {
    local: Arc<dyn LocalRecordStore>,
    stager: MediaStager,
    identity: Arc<dyn IdentityProvider>,
    cloud: Option<CloudBackend>,
    geocoder: Option<Arc<dyn Geocoder>>,
    event_sink: Option<Arc<dyn EventSink>>,
    event_buffer: usize,
}

impl SyncOrchestratorBuilder {
    pub fn cloud(mut self, cloud: CloudBackend) -> Self {
        self.cloud = Some(cloud);
        self
    }

    pub fn geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    pub fn event_buffer(mut self, buffer: usize) -> Self {
        self.event_buffer = buffer.max(1);
        self
    }

    pub fn build(self) -> SyncOrchestrator {
        debug!(
            "building sync orchestrator (cloud={}, geocoder={}, event_buffer={})",
            self.cloud.is_some(),
            self.geocoder.is_some(),
            self.event_buffer
        );
        SyncOrchestrator {
            inner: Arc::new(Inner {
                reconciler: Reconciler::new(self.local.clone()),
                local: self.local,
                stager: self.stager,
                cloud: self.cloud,
                identity: self.identity,
                geocoder: self.geocoder,
                notifier: Notifier::new(self.event_buffer, self.event_sink),
                records: Mutex::new(Vec::new()),
                permission_reported: AtomicBool::new(false),
            }),
        }
    }
}

/// Entry point for the UI layer: save, delete, list and change notifications.
#[derive(Clone)]
pub struct SyncOrchestrator {
    inner: Arc<Inner>,
}

impl SyncOrchestrator {
    pub fn builder(
        local: Arc<dyn LocalRecordStore>,
        stager: MediaStager,
        identity: Arc<dyn IdentityProvider>,
    ) -> SyncOrchestratorBuilder {
        SyncOrchestratorBuilder {
            local,
            stager,
            identity,
            cloud: None,
            geocoder: None,
            event_sink: None,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }

    /// App-start trigger: load the local set, then fetch and reconcile.
    pub async fn start(&self) -> Result<Vec<Record>, SyncError> {
        self.load_local().await;
        let outcome = self.sync_remote().await?;
        debug!("startup sync finished (outcome={:?})", outcome);
        Ok(self.list().await)
    }

    /// Replace the in-memory set with whatever local storage holds.
    pub async fn load_local(&self) -> Vec<Record> {
        let mut records = self.inner.records.lock().await;
        let mut loaded = self.inner.local.load_all();
        sort_newest_first(&mut loaded);
        info!("loaded local records (count={})", loaded.len());
        *records = loaded;
        self.inner.notifier.records_changed(&records);
        records.clone()
    }

    /// Fetch the owner's remote set and reconcile it into local storage.
    ///
    /// Remote failures are reported through events and yield
    /// [`RemoteSync::Unavailable`]; only a local write failure is an error.
    pub async fn sync_remote(&self) -> Result<RemoteSync, SyncError> {
        let Some(cloud) = self.inner.cloud.clone() else {
            return Ok(RemoteSync::Disabled);
        };
        let Some(owner) = self.inner.identity.current_owner() else {
            return Ok(RemoteSync::SignedOut);
        };
        let remote = match cloud.records.list(&owner).await {
            Ok(remote) => remote,
            Err(err) => {
                self.inner
                    .report_remote_failure(None, RemoteOperation::List, &err);
                return Ok(RemoteSync::Unavailable);
            }
        };

        let mut records = self.inner.records.lock().await;
        let merged = self.inner.reconciler.reconcile(&records, &remote)?;
        *records = merged;
        self.inner.notifier.records_changed(&records);
        info!(
            "remote records reconciled (owner={}, remote={}, total={})",
            owner,
            remote.len(),
            records.len()
        );
        Ok(RemoteSync::Reconciled {
            remote: remote.len(),
            total: records.len(),
        })
    }

    /// Identity trigger: reconcile whenever an owner becomes available.
    pub fn watch_identity(&self) -> JoinHandle<()> {
        let orchestrator = self.clone();
        let mut receiver = self.inner.identity.subscribe();
        tokio::spawn(async move {
            while receiver.changed().await.is_ok() {
                let owner = receiver.borrow_and_update().clone();
                let Some(owner) = owner else {
                    debug!("identity cleared, remaining local-only");
                    continue;
                };
                orchestrator
                    .inner
                    .permission_reported
                    .store(false, Ordering::SeqCst);
                match orchestrator.sync_remote().await {
                    Ok(outcome) => {
                        debug!("identity sync finished (owner={}, outcome={:?})", owner, outcome)
                    }
                    Err(err) => warn!("identity sync failed (owner={}): {}", owner, err),
                }
            }
        })
    }

    /// Delete one record and its staged media locally, then best-effort
    /// remotely.
    pub async fn delete(&self, id: &str) -> Result<RemoteTask, SyncError> {
        let removed = {
            let mut records = self.inner.records.lock().await;
            let (removed, next): (Vec<Record>, Vec<Record>) = records
                .iter()
                .cloned()
                .partition(|record| record.id == id);
            if removed.is_empty() {
                debug!("delete of unknown local record (id={})", id);
            } else {
                self.inner.local.save_all(&next)?;
                *records = next;
                self.inner.notifier.records_changed(&records);
                info!("memory deleted locally (id={})", id);
            }
            removed
        };
        for record in &removed {
            self.inner.stager.discard(&record.media).await;
        }

        let Some((owner, cloud)) = self.inner.owner_and_cloud() else {
            return Ok(RemoteTask::skipped());
        };
        let inner = self.inner.clone();
        let id = id.to_string();
        Ok(RemoteTask::spawn(async move {
            match cloud.records.delete(&owner, &id).await {
                Ok(()) => RemoteOutcome::Committed,
                Err(err) => {
                    inner.report_remote_failure(Some(&id), RemoteOperation::Delete, &err);
                    RemoteOutcome::Failed(err.to_string())
                }
            }
        }))
    }

    /// Current set, newest first.
    pub async fn list(&self) -> Vec<Record> {
        self.inner.records.lock().await.clone()
    }

    /// Current set in a display order.
    pub async fn list_sorted(&self, order: SortOrder) -> Vec<Record> {
        let mut records = self.list().await;
        sort_records(&mut records, order);
        records
    }

    /// Register a callback run with the full set after every change.
    pub fn on_records_changed(&self, callback: impl Fn(&[Record]) + Send + Sync + 'static) {
        let listener: RecordsListener = Arc::new(callback);
        self.inner.notifier.add_listener(listener);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.inner.notifier.subscribe()
    }

    /// Drop the local set and its staged media; the cloud copy is untouched.
    pub async fn clear_local(&self) -> Result<usize, SyncError> {
        let cleared = {
            let mut records = self.inner.records.lock().await;
            self.inner.local.clear()?;
            let cleared = std::mem::take(&mut *records);
            self.inner.notifier.records_changed(&records);
            cleared
        };
        let media: Vec<MediaItem> = cleared
            .iter()
            .flat_map(|record| record.media.iter().cloned())
            .collect();
        self.inner.stager.discard(&media).await;
        info!("local records cleared (removed={})", cleared.len());
        Ok(cleared.len())
    }

    /// Clear the local set, then delete the owner's remote collection.
    pub async fn delete_all(&self) -> Result<DeleteAllReport, SyncError> {
        let local_removed = self.clear_local().await?;
        let remote_removed = match self.inner.owner_and_cloud() {
            Some((owner, cloud)) => match cloud.records.delete_all(&owner).await {
                Ok(removed) => Some(removed),
                Err(err) => {
                    self.inner
                        .report_remote_failure(None, RemoteOperation::DeleteAll, &err);
                    None
                }
            },
            None => None,
        };
        info!(
            "all memories deleted (local={}, remote={:?})",
            local_removed, remote_removed
        );
        Ok(DeleteAllReport {
            local_removed,
            remote_removed,
        })
    }

    /// Fill in missing location names from the geocoder.
    ///
    /// Returns how many records gained a name. Lookups run without holding
    /// the record set, so saves are not held up by the geocoder; names are
    /// applied by id to records that still have none.
    pub async fn enrich_location_names(&self) -> Result<usize, SyncError> {
        let Some(geocoder) = self.inner.geocoder.clone() else {
            return Ok(0);
        };
        let targets: Vec<(RecordId, Location)> = self
            .inner
            .records
            .lock()
            .await
            .iter()
            .filter(|record| record.attributes.location_name.is_none())
            .map(|record| (record.id.clone(), record.location))
            .collect();
        if targets.is_empty() {
            return Ok(0);
        }

        let names = join_all(
            targets
                .iter()
                .map(|(_, location)| geocoder.location_name(*location)),
        )
        .await;
        let resolved_names: HashMap<RecordId, String> = targets
            .into_iter()
            .zip(names)
            .filter_map(|((id, _), name)| {
                name.filter(|name| !name.trim().is_empty())
                    .map(|name| (id, name))
            })
            .collect();
        if resolved_names.is_empty() {
            return Ok(0);
        }

        let mut records = self.inner.records.lock().await;
        let mut next = records.clone();
        let mut resolved = 0;
        for record in next.iter_mut() {
            if record.attributes.location_name.is_some() {
                continue;
            }
            if let Some(name) = resolved_names.get(&record.id) {
                record.attributes.location_name = Some(name.clone());
                resolved += 1;
            }
        }
        if resolved == 0 {
            return Ok(0);
        }

        self.inner.local.save_all(&next)?;
        *records = next;
        self.inner.notifier.records_changed(&records);
        info!(
            "location names resolved (resolved={}, looked_up={})",
            resolved,
            resolved_names.len()
        );
        Ok(resolved)
    }

    /// Export the current set as `memories_<date>.json` under `dir`.
    pub async fn export(&self, dir: impl AsRef<Path>, date: NaiveDate) -> Result<PathBuf, SyncError> {
        let records = self.list().await;
        Ok(export_json(&records, dir, date)?)
    }
}
