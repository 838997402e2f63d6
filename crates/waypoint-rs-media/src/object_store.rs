//! Remote object storage backends.

use crate::error::MediaError;
use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use std::path::{Path, PathBuf};

/// Immutable object storage addressed by relative path.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `bytes` at `path`, overwriting any existing object, and return
    /// the stable public URL.
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str)
    -> Result<String, MediaError>;
}

fn public_object_url(public_url: &str, path: &str) -> String {
    format!("{}/{}", public_url.trim_end_matches('/'), path)
}

/// Objects written under a local directory and served from `public_url`.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
    public_url: String,
}

impl FsObjectStore {
    pub fn new(root: impl AsRef<Path>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            public_url: public_url.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, MediaError> {
        let destination = self.root.join(path);
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&destination, bytes).await?;
        debug!(
            "stored object (path={}, content_type={})",
            path, content_type
        );
        Ok(public_object_url(&self.public_url, path))
    }
}

/// Objects uploaded with `PUT <upload_url>/<path>`.
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: reqwest::Client,
    upload_url: String,
    public_url: String,
}

impl HttpObjectStore {
    pub fn new(upload_url: impl Into<String>, public_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), upload_url, public_url)
    }

    pub fn with_client(
        client: reqwest::Client,
        upload_url: impl Into<String>,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            upload_url: upload_url.into(),
            public_url: public_url.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, MediaError> {
        let url = public_object_url(&self.upload_url, path);
        let response = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::Transport(format!(
                "upload to {url} failed with status {status}"
            )));
        }
        debug!("uploaded object (path={}, status={})", path, status);
        Ok(public_object_url(&self.public_url, path))
    }
}

#[cfg(test)]
mod tests {
    use super::{FsObjectStore, ObjectStore};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[tokio::test]
    async fn fs_store_overwrites_same_path() {
        let temp = tempdir().expect("tempdir");
        let store = FsObjectStore::new(temp.path(), "https://cdn.example/");
        let url = store
            .put("owners/a/records/r/media_0.jpg", b"one".to_vec(), "image/jpeg")
            .await
            .expect("put");
        let again = store
            .put("owners/a/records/r/media_0.jpg", b"two".to_vec(), "image/jpeg")
            .await
            .expect("put");
        assert_eq!(url, "https://cdn.example/owners/a/records/r/media_0.jpg");
        assert_eq!(url, again);
        let stored = std::fs::read(temp.path().join("owners/a/records/r/media_0.jpg"))
            .expect("read");
        assert_eq!(stored, b"two");
    }
}
