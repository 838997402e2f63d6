//! Media staging and upload for Waypoint records.
//!
//! Picked media goes through two steps: [`MediaStager`] copies it into a
//! durable per-record directory, then [`RemoteUploader`] pushes the copy to
//! an [`ObjectStore`] at a deterministic path.

pub mod error;
pub mod naming;
pub mod object_store;
pub mod source;
pub mod stager;
pub mod uploader;

pub use error::{MediaError, UploadError};
pub use naming::{remote_media_path, upload_format};
pub use object_store::{FsObjectStore, HttpObjectStore, ObjectStore};
pub use source::{FileMediaSource, MediaReader, MediaSource, local_path, read_media};
pub use stager::{MediaStager, StagedMedia};
pub use uploader::RemoteUploader;
