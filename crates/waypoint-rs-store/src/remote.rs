//! Per-owner remote document collection.

use crate::document::{cloud_document, merge_record_document};
use crate::error::RemoteError;
use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;
use waypoint_rs_protocol::{Record, sort_newest_first};

/// Remote collection of cloud records, keyed by owner then record id.
///
/// Writes accept only cloud projections; any device-local media uri is
/// rejected with [`RemoteError::LocalMediaRejected`].
#[async_trait]
pub trait RemoteRecordStore: Send + Sync {
    /// List the owner's records, newest first.
    async fn list(&self, owner: &str) -> Result<Vec<Record>, RemoteError>;
    /// Create or merge the record's document. Fields absent from the record
    /// are left as they were on the stored document, except legacy media
    /// fields, which the record's `media` list replaces.
    async fn upsert(&self, owner: &str, record: &Record) -> Result<(), RemoteError>;
    /// Delete one document. Deleting a missing document succeeds.
    async fn delete(&self, owner: &str, id: &str) -> Result<(), RemoteError>;
    /// Delete every document for the owner and return how many were removed.
    async fn delete_all(&self, owner: &str) -> Result<usize, RemoteError>;
}

/// Filesystem-backed collection at `<root>/owners/<owner>/records/<id>.json`.
#[derive(Debug, Clone)]
pub struct FsRemoteRecordStore {
    root: PathBuf,
}

impl FsRemoteRecordStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn collection_dir(&self, owner: &str) -> Result<PathBuf, RemoteError> {
        validate_key(owner)?;
        Ok(self.root.join("owners").join(owner).join("records"))
    }

    fn document_path(&self, owner: &str, id: &str) -> Result<PathBuf, RemoteError> {
        validate_key(id)?;
        Ok(self.collection_dir(owner)?.join(format!("{id}.json")))
    }
}

#[async_trait]
impl RemoteRecordStore for FsRemoteRecordStore {
    async fn list(&self, owner: &str) -> Result<Vec<Record>, RemoteError> {
        let dir = self.collection_dir(owner)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path).await?;
            match serde_json::from_slice::<Record>(&bytes) {
                Ok(record) if !record.id.is_empty() => records.push(record),
                Ok(_) => warn!("remote document without id ignored (path={})", path.display()),
                Err(err) => warn!(
                    "invalid remote document ignored (path={}): {err}",
                    path.display()
                ),
            }
        }
        sort_newest_first(&mut records);
        debug!("listed remote records (owner={}, count={})", owner, records.len());
        Ok(records)
    }

    async fn upsert(&self, owner: &str, record: &Record) -> Result<(), RemoteError> {
        let incoming = cloud_document(record)?;
        let path = self.document_path(owner, &record.id)?;
        let document = match fs::read(&path).await {
            Ok(bytes) => {
                let mut existing: Value = serde_json::from_slice(&bytes)?;
                merge_record_document(&mut existing, &incoming);
                existing
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => incoming,
            Err(err) => return Err(err.into()),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, serde_json::to_vec_pretty(&document)?).await?;
        fs::rename(&temp_path, &path).await?;
        debug!("upserted remote record (owner={}, id={})", owner, record.id);
        Ok(())
    }

    async fn delete(&self, owner: &str, id: &str) -> Result<(), RemoteError> {
        let path = self.document_path(owner, id)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("deleted remote record (owner={}, id={})", owner, id);
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_all(&self, owner: &str) -> Result<usize, RemoteError> {
        let dir = self.collection_dir(owner)?;
        let staging = dir.with_file_name(format!("records.deleting-{}", Uuid::new_v4()));
        // Detach the whole collection first so the removal lands as one unit.
        match fs::rename(&dir, &staging).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err.into()),
        }

        let mut removed = 0;
        let mut entries = fs::read_dir(&staging).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.path().extension().and_then(|ext| ext.to_str()) == Some("json") {
                removed += 1;
            }
        }
        fs::remove_dir_all(&staging).await?;
        info!("deleted all remote records (owner={}, removed={})", owner, removed);
        Ok(removed)
    }
}

fn validate_key(key: &str) -> Result<(), RemoteError> {
    if key.is_empty() || key.starts_with('.') || key.contains(['/', '\\']) {
        return Err(RemoteError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{FsRemoteRecordStore, RemoteRecordStore};
    use crate::RemoteError;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;
    use waypoint_rs_protocol::{Location, MediaItem, Record, RecordAttributes};

    fn record(id: &str, created_at: i64, media: Vec<MediaItem>) -> Record {
        Record {
            id: id.to_string(),
            media,
            attributes: RecordAttributes::default(),
            location: Location::new(0.5, 0.5),
            created_at,
        }
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let temp = tempdir().expect("tempdir");
        let store = FsRemoteRecordStore::new(temp.path());
        for (id, created_at) in [("a", 100), ("b", 300), ("c", 200)] {
            store
                .upsert("alice", &record(id, created_at, Vec::new()))
                .await
                .expect("upsert");
        }
        let ids: Vec<String> = store
            .list("alice")
            .await
            .expect("list")
            .into_iter()
            .map(|record| record.id)
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert_eq!(store.list("bob").await.expect("list").len(), 0);
    }

    #[tokio::test]
    async fn upsert_merges_with_existing_document() {
        let temp = tempdir().expect("tempdir");
        let store = FsRemoteRecordStore::new(temp.path());
        let mut first = record("r1", 1, vec![MediaItem::image("https://cdn/a.jpg")]);
        first.attributes.note = Some("keep me".to_string());
        store.upsert("alice", &first).await.expect("upsert");

        let mut second = record("r1", 1, Vec::new());
        second.attributes.title = Some("Renamed".to_string());
        store.upsert("alice", &second).await.expect("upsert");

        let stored = store.list("alice").await.expect("list");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].attributes.title.as_deref(), Some("Renamed"));
        assert_eq!(stored[0].attributes.note.as_deref(), Some("keep me"));
        assert_eq!(stored[0].media, Vec::<MediaItem>::new());
    }

    #[tokio::test]
    async fn upsert_rejects_local_media() {
        let temp = tempdir().expect("tempdir");
        let store = FsRemoteRecordStore::new(temp.path());
        let err = store
            .upsert("alice", &record("r1", 1, vec![MediaItem::video("file:///v.mov")]))
            .await
            .expect_err("local media");
        assert!(matches!(err, RemoteError::LocalMediaRejected { .. }));
        assert_eq!(store.list("alice").await.expect("list").len(), 0);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let temp = tempdir().expect("tempdir");
        let store = FsRemoteRecordStore::new(temp.path());
        store
            .upsert("alice", &record("r1", 1, Vec::new()))
            .await
            .expect("upsert");
        store.delete("alice", "r1").await.expect("delete");
        store.delete("alice", "r1").await.expect("delete again");
        assert_eq!(store.list("alice").await.expect("list").len(), 0);
    }

    #[tokio::test]
    async fn delete_all_reports_count_and_scopes_to_owner() {
        let temp = tempdir().expect("tempdir");
        let store = FsRemoteRecordStore::new(temp.path());
        for id in ["a", "b", "c"] {
            store
                .upsert("alice", &record(id, 1, Vec::new()))
                .await
                .expect("upsert");
        }
        store
            .upsert("bob", &record("z", 1, Vec::new()))
            .await
            .expect("upsert");

        assert_eq!(store.delete_all("alice").await.expect("delete all"), 3);
        assert_eq!(store.delete_all("alice").await.expect("delete all"), 0);
        assert_eq!(store.list("bob").await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn rejects_path_like_keys() {
        let temp = tempdir().expect("tempdir");
        let store = FsRemoteRecordStore::new(temp.path());
        let err = store.delete("../alice", "r1").await.expect_err("bad owner");
        assert!(matches!(err, RemoteError::InvalidKey(_)));
        let err = store.delete("alice", "").await.expect_err("bad id");
        assert!(matches!(err, RemoteError::InvalidKey(_)));
    }
}
