//! Durable local copies of freshly picked media.

use crate::error::MediaError;
use crate::naming::{is_plain_segment, staging_extension};
use crate::source::{MediaSource, local_path, read_media};
use log::{debug, warn};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use waypoint_rs_protocol::MediaItem;

/// Outcome of staging one item.
///
/// On failure `item` is the original, possibly ephemeral, handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedMedia {
    pub item: MediaItem,
    pub failed: bool,
}

impl StagedMedia {
    fn kept(item: MediaItem) -> Self {
        Self {
            item,
            failed: false,
        }
    }
}

/// Copies media into `<root>/<owner>/<record>/`.
#[derive(Clone)]
pub struct MediaStager {
    root: PathBuf,
    source: Arc<dyn MediaSource>,
}

impl MediaStager {
    pub fn new(root: impl AsRef<Path>, source: Arc<dyn MediaSource>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            source,
        }
    }

    /// Durable directory for one record.
    pub fn record_dir(&self, owner: &str, record_id: &str) -> PathBuf {
        self.root.join(owner).join(record_id)
    }

    /// Stage `item` for the given owner and record. Never fails: a copy
    /// error returns the original item with `failed` set.
    pub async fn stage(
        &self,
        item: &MediaItem,
        owner: &str,
        record_id: &str,
        index: usize,
    ) -> StagedMedia {
        if item.is_remote() {
            return StagedMedia::kept(item.clone());
        }
        match self.copy_into_record_dir(item, owner, record_id).await {
            Ok(Some(uri)) => {
                debug!(
                    "staged media (record_id={}, index={}, uri={})",
                    record_id, index, uri
                );
                StagedMedia::kept(MediaItem::new(uri, item.kind))
            }
            Ok(None) => StagedMedia::kept(item.clone()),
            Err(err) => {
                warn!(
                    "media staging failed, keeping original (record_id={}, index={}): {}",
                    record_id, index, err
                );
                StagedMedia {
                    item: item.clone(),
                    failed: true,
                }
            }
        }
    }

    /// Remove the staged copies among `items` and any record directory they
    /// leave empty. Items outside the staging root are left alone.
    pub async fn discard(&self, items: &[MediaItem]) -> usize {
        let mut removed = 0;
        for item in items {
            let Some(path) = self.staged_path(item) else {
                continue;
            };
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => {
                    warn!("staged media not removed (path={}): {}", path.display(), err);
                    continue;
                }
            }
            if let Some(dir) = path.parent()
                && dir != self.root
            {
                // Fails while other copies remain, which is fine.
                let _ = tokio::fs::remove_dir(dir).await;
            }
        }
        if removed > 0 {
            debug!("discarded staged media (removed={})", removed);
        }
        removed
    }

    fn staged_path(&self, item: &MediaItem) -> Option<PathBuf> {
        if item.is_remote() {
            return None;
        }
        let path = local_path(&item.uri).ok()?;
        let escapes = path
            .components()
            .any(|component| matches!(component, Component::ParentDir));
        (!escapes && path.starts_with(&self.root)).then_some(path)
    }

    /// Returns `None` when the item already lives in the record directory.
    async fn copy_into_record_dir(
        &self,
        item: &MediaItem,
        owner: &str,
        record_id: &str,
    ) -> Result<Option<String>, MediaError> {
        for segment in [owner, record_id] {
            if !is_plain_segment(segment) {
                return Err(MediaError::InvalidKey(segment.to_string()));
            }
        }
        let dir = self.record_dir(owner, record_id);
        if let Ok(path) = local_path(&item.uri)
            && path.starts_with(&dir)
        {
            return Ok(None);
        }

        tokio::fs::create_dir_all(&dir).await?;
        let bytes = read_media(self.source.as_ref(), &item.uri).await?;
        let file_name = format!(
            "{}_{:08x}.{}",
            chrono::Utc::now().timestamp_millis(),
            rand::random::<u32>(),
            staging_extension(item.kind, &item.uri)
        );
        let destination = dir.join(file_name);
        tokio::fs::write(&destination, bytes).await?;
        Ok(Some(format!("file://{}", destination.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::MediaStager;
    use crate::source::{FileMediaSource, local_path};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::tempdir;
    use waypoint_rs_protocol::{MediaItem, MediaKind};

    fn stager(root: &std::path::Path) -> MediaStager {
        MediaStager::new(root, Arc::new(FileMediaSource))
    }

    #[tokio::test]
    async fn remote_items_pass_through() {
        let temp = tempdir().expect("tempdir");
        let item = MediaItem::image("https://cdn/a.jpg");
        let staged = stager(temp.path()).stage(&item, "alice", "r1", 0).await;
        assert_eq!(staged.item, item);
        assert!(!staged.failed);
        assert!(!temp.path().join("alice").exists());
    }

    #[tokio::test]
    async fn copies_into_record_dir_and_is_idempotent() {
        let temp = tempdir().expect("tempdir");
        let picked = temp.path().join("picker").join("IMG_1.HEIC");
        std::fs::create_dir_all(picked.parent().expect("parent")).expect("dir");
        std::fs::write(&picked, b"heic-bytes").expect("write");

        let stager = stager(&temp.path().join("media"));
        let item = MediaItem::image(format!("file://{}", picked.display()));
        let staged = stager.stage(&item, "alice", "r1", 0).await;
        assert!(!staged.failed);
        assert_eq!(staged.item.kind, MediaKind::Image);

        let path = local_path(&staged.item.uri).expect("path");
        assert!(path.starts_with(stager.record_dir("alice", "r1")));
        assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("heic"));
        assert_eq!(std::fs::read(&path).expect("read"), b"heic-bytes");

        let again = stager.stage(&staged.item, "alice", "r1", 0).await;
        assert_eq!(again, staged);
    }

    #[tokio::test]
    async fn copy_failure_keeps_original_item() {
        let temp = tempdir().expect("tempdir");
        let item = MediaItem::video("file:///definitely/missing/clip");
        let staged = stager(temp.path()).stage(&item, "alice", "r1", 3).await;
        assert!(staged.failed);
        assert_eq!(staged.item, item);
    }

    #[tokio::test]
    async fn path_like_owner_is_a_staging_failure() {
        let temp = tempdir().expect("tempdir");
        let item = MediaItem::image("/tmp/a.jpg");
        let staged = stager(temp.path()).stage(&item, "../escape", "r1", 0).await;
        assert!(staged.failed);
        assert_eq!(staged.item, item);
    }

    #[tokio::test]
    async fn discard_removes_only_staged_copies() {
        let temp = tempdir().expect("tempdir");
        let picked = temp.path().join("IMG_2.jpg");
        std::fs::write(&picked, b"jpg").expect("write");
        let original = MediaItem::image(format!("file://{}", picked.display()));

        let stager = stager(&temp.path().join("media"));
        let first = stager.stage(&original, "alice", "r1", 0).await.item;
        let second = stager.stage(&original, "alice", "r1", 1).await.item;
        let outside = MediaItem::image(format!(
            "file://{}/../IMG_2.jpg",
            stager.record_dir("alice", "r1").display()
        ));

        let removed = stager
            .discard(&[first.clone(), original.clone(), outside])
            .await;
        assert_eq!(removed, 1);
        assert!(picked.exists());
        assert!(stager.record_dir("alice", "r1").exists());

        assert_eq!(stager.discard(&[first, second]).await, 1);
        assert!(!stager.record_dir("alice", "r1").exists());
    }
}
