//! Byte readers for device media handles.

use crate::error::MediaError;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Opens readers for media uris.
///
/// Mobile platforms hand out opaque handles rather than paths, so callers
/// never open files directly; they go through a source and must call
/// [`MediaReader::release`] once done.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn open(&self, uri: &str) -> Result<Box<dyn MediaReader>, MediaError>;
}

/// An open byte stream for one media handle.
#[async_trait]
pub trait MediaReader: Send {
    async fn read_all(&mut self) -> Result<Vec<u8>, MediaError>;
    /// Release the underlying transport. Safe to call more than once.
    async fn release(&mut self);
}

/// Resolve a `file://` uri or plain path to a filesystem path.
pub fn local_path(uri: &str) -> Result<PathBuf, MediaError> {
    if let Some(path) = uri.strip_prefix("file://") {
        return Ok(PathBuf::from(path));
    }
    if uri.contains("://") {
        return Err(MediaError::UnsupportedUri(uri.to_string()));
    }
    Ok(PathBuf::from(uri))
}

/// Reads `file://` uris and plain paths from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FileMediaSource;

#[async_trait]
impl MediaSource for FileMediaSource {
    async fn open(&self, uri: &str) -> Result<Box<dyn MediaReader>, MediaError> {
        let file = File::open(local_path(uri)?).await?;
        Ok(Box::new(FileReader { file: Some(file) }))
    }
}

struct FileReader {
    file: Option<File>,
}

#[async_trait]
impl MediaReader for FileReader {
    async fn read_all(&mut self) -> Result<Vec<u8>, MediaError> {
        let file = self.file.as_mut().ok_or(MediaError::Released)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).await?;
        Ok(bytes)
    }

    async fn release(&mut self) {
        self.file.take();
    }
}

/// Open `uri`, read every byte and release the reader on every path.
pub async fn read_media(source: &dyn MediaSource, uri: &str) -> Result<Vec<u8>, MediaError> {
    let mut reader = source.open(uri).await?;
    let result = reader.read_all().await;
    reader.release().await;
    result
}
