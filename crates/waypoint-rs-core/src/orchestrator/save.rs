//! Save pipeline: stage, upload, commit locally, then upsert remotely.

use super::task::{RemoteOutcome, RemoteTask};
use super::{LOCAL_OWNER, SyncOrchestrator};
use crate::error::SyncError;
use futures_util::future::join_all;
use log::{debug, info};
use uuid::Uuid;
use waypoint_rs_protocol::{
    Draft, EventSink, MediaItem, Record, RemoteOperation, SaveStatus, SyncEvent,
    sort_newest_first,
};

/// Result of a save once the record is committed locally.
#[derive(Debug)]
pub struct SaveReceipt {
    /// Local projection as written to the device.
    pub record: Record,
    /// Cloud projection handed to the remote store, when one was built.
    pub cloud: Option<Record>,
    pub status: SaveStatus,
    /// Remote upsert still in flight.
    pub remote: RemoteTask,
}

impl SyncOrchestrator {
    /// Save a draft.
    ///
    /// Returns once the local projection is written. Media staging and
    /// upload failures degrade the result status; only a local write failure
    /// is an error, in which case the in-memory set is left unchanged. A
    /// coordinate that could not be read back is rejected before any work.
    pub async fn save(&self, draft: Draft) -> Result<SaveReceipt, SyncError> {
        if !draft.location.is_valid() {
            return Err(SyncError::InvalidLocation(draft.location));
        }
        let inner = &self.inner;
        let owner = inner.identity.current_owner();
        let record_id = draft
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let now = chrono::Utc::now().timestamp_millis();
        let staging_owner = owner.as_deref().unwrap_or(LOCAL_OWNER);

        let staged = join_all(
            draft
                .media
                .iter()
                .enumerate()
                .map(|(index, item)| inner.stager.stage(item, staging_owner, &record_id, index)),
        )
        .await;
        let staging_failures = staged.iter().filter(|staged| staged.failed).count();
        let local_media: Vec<MediaItem> = staged.into_iter().map(|staged| staged.item).collect();

        let (cloud_media, status) = match (owner.as_deref(), inner.cloud.as_ref()) {
            (Some(owner), Some(cloud)) => {
                let uploads = join_all(local_media.iter().enumerate().map(|(index, item)| {
                    cloud
                        .uploader
                        .upload(&item.uri, owner, &record_id, item.kind, index)
                }))
                .await;
                let mut failed = 0;
                let mut media = Vec::with_capacity(uploads.len());
                for (item, upload) in local_media.iter().zip(uploads) {
                    match upload {
                        Ok(url) => media.push(MediaItem::new(url, item.kind)),
                        Err(_) => failed += 1,
                    }
                }
                (Some(media), SaveStatus::from_failures(failed))
            }
            _ => (None, SaveStatus::LocalOnly),
        };

        let (record, previous) = {
            let mut records = inner.records.lock().await;
            let previous = records
                .iter()
                .find(|existing| existing.id == record_id)
                .cloned();
            let created_at = previous
                .as_ref()
                .map(|existing| existing.created_at)
                .unwrap_or(now);
            let record = Record {
                id: record_id.clone(),
                media: local_media,
                attributes: draft.attributes,
                location: draft.location,
                created_at,
            };
            let mut next = records.clone();
            match next.iter_mut().find(|existing| existing.id == record.id) {
                Some(slot) => *slot = record.clone(),
                None => next.push(record.clone()),
            }
            sort_newest_first(&mut next);
            inner.local.save_all(&next)?;
            *records = next;
            inner.notifier.records_changed(&records);
            (record, previous)
        };
        if let Some(previous) = previous {
            let dropped: Vec<MediaItem> = previous
                .media
                .into_iter()
                .filter(|item| record.media.iter().all(|kept| kept.uri != item.uri))
                .collect();
            inner.stager.discard(&dropped).await;
        }
        info!(
            "memory saved locally (record_id={}, media={}, staging_failures={}, status={:?})",
            record.id,
            record.media.len(),
            staging_failures,
            status
        );
        inner.notifier.emit(SyncEvent::SaveCommitted {
            record_id: record.id.clone(),
            status,
        });

        let cloud = cloud_media.map(|media| {
            Record {
                media,
                ..record.clone()
            }
            .cloud_projection()
        });
        let remote = match (&cloud, owner, inner.cloud.clone()) {
            (Some(document), Some(owner), Some(backend)) => {
                let inner = self.inner.clone();
                let document = document.clone();
                RemoteTask::spawn(async move {
                    match backend.records.upsert(&owner, &document).await {
                        Ok(()) => {
                            debug!("remote upsert committed (record_id={})", document.id);
                            RemoteOutcome::Committed
                        }
                        Err(err) => {
                            inner.report_remote_failure(
                                Some(&document.id),
                                RemoteOperation::Upsert,
                                &err,
                            );
                            RemoteOutcome::Failed(err.to_string())
                        }
                    }
                })
            }
            _ => RemoteTask::skipped(),
        };

        Ok(SaveReceipt {
            record,
            cloud,
            status,
            remote,
        })
    }
}
