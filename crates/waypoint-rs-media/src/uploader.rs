//! Uploads staged media to deterministic remote paths.

use crate::error::{MediaError, UploadError};
use crate::naming::{is_plain_segment, remote_media_path, upload_format};
use crate::object_store::ObjectStore;
use crate::source::{MediaSource, read_media};
use log::{debug, warn};
use std::sync::Arc;
use waypoint_rs_protocol::{MediaKind, is_remote_uri};

/// Uploads one media item at a time; batches are driven by the caller.
#[derive(Clone)]
pub struct RemoteUploader {
    source: Arc<dyn MediaSource>,
    objects: Arc<dyn ObjectStore>,
}

impl RemoteUploader {
    pub fn new(source: Arc<dyn MediaSource>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { source, objects }
    }

    /// Upload `local_uri` and return its remote URL.
    ///
    /// Remote uris are returned unchanged without touching the network. The
    /// object path depends only on owner, record, index and format, so a
    /// retry overwrites the same object.
    pub async fn upload(
        &self,
        local_uri: &str,
        owner: &str,
        record_id: &str,
        kind: MediaKind,
        index: usize,
    ) -> Result<String, UploadError> {
        if is_remote_uri(local_uri) {
            return Ok(local_uri.to_string());
        }
        self.put_object(local_uri, owner, record_id, kind, index)
            .await
            .map_err(|source| {
                warn!(
                    "media upload failed (record_id={}, index={}): {}",
                    record_id, index, source
                );
                UploadError {
                    local_uri: local_uri.to_string(),
                    kind,
                    source,
                }
            })
    }

    async fn put_object(
        &self,
        local_uri: &str,
        owner: &str,
        record_id: &str,
        kind: MediaKind,
        index: usize,
    ) -> Result<String, MediaError> {
        for segment in [owner, record_id] {
            if !is_plain_segment(segment) {
                return Err(MediaError::InvalidKey(segment.to_string()));
            }
        }
        let (ext, content_type) = upload_format(kind, local_uri);
        let path = remote_media_path(owner, record_id, index, ext);
        let bytes = read_media(self.source.as_ref(), local_uri).await?;
        let url = self.objects.put(&path, bytes, content_type).await?;
        debug!("uploaded media (record_id={}, index={}, url={})", record_id, index, url);
        Ok(url)
    }
}
