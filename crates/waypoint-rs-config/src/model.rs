//! Configuration schema for Waypoint.

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory under the home folder holding config and default data.
pub const DEFAULT_HOME_DIR: &str = ".waypoint";
/// Default key (file stem) of the local record set.
pub const DEFAULT_STORAGE_KEY: &str = "memories_v1";

/// Root config for the Waypoint sync core.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WaypointConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

impl WaypointConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> WaypointConfigBuilder {
        WaypointConfigBuilder::new()
    }
}

/// Builder for assembling a `WaypointConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct WaypointConfigBuilder {
    config: WaypointConfig,
}

impl WaypointConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: WaypointConfig::default(),
        }
    }

    /// Replace the local storage configuration.
    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.config.storage = storage;
        self
    }

    /// Replace the media staging configuration.
    pub fn media(mut self, media: MediaConfig) -> Self {
        self.config.media = media;
        self
    }

    /// Replace the remote store configuration.
    pub fn remote(mut self, remote: RemoteConfig) -> Self {
        self.config.remote = remote;
        self
    }

    /// Replace the sync behaviour configuration.
    pub fn sync(mut self, sync: SyncConfig) -> Self {
        self.config.sync = sync;
        self
    }

    /// Pin the owner identity.
    pub fn owner_id(mut self, owner_id: impl Into<String>) -> Self {
        self.config.identity.owner_id = Some(owner_id.into());
        self
    }

    /// Finalize and return the built `WaypointConfig`.
    pub fn build(self) -> WaypointConfig {
        self.config
    }
}

/// Local record set persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the record set file (defaults to `~/.waypoint/data`).
    #[serde(default)]
    pub root: Option<String>,
    /// File stem of the serialized record set.
    #[serde(default = "default_storage_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: None,
            key: default_storage_key(),
        }
    }
}

impl StorageConfig {
    /// Resolve the storage directory, falling back to the home data dir.
    pub fn resolved_root(&self) -> PathBuf {
        resolve_dir(self.root.as_deref(), "data")
    }
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

/// Durable media staging.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MediaConfig {
    /// Root of the per-owner, per-record media tree (defaults to `~/.waypoint/media`).
    #[serde(default)]
    pub root: Option<String>,
}

impl MediaConfig {
    /// Resolve the media root directory.
    pub fn resolved_root(&self) -> PathBuf {
        resolve_dir(self.root.as_deref(), "media")
    }
}

/// Remote record and object store settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RemoteConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Root of the filesystem-backed document collection.
    #[serde(default)]
    pub records_root: Option<String>,
    #[serde(default)]
    pub objects: ObjectStoreConfig,
}

impl RemoteConfig {
    /// Resolve the document collection root.
    pub fn resolved_records_root(&self) -> PathBuf {
        resolve_dir(self.records_root.as_deref(), "remote")
    }
}

/// Backend used for uploaded media objects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ObjectStoreKind {
    /// Objects written under a local directory and served from `public_url`.
    #[default]
    Fs,
    /// Objects PUT to `upload_url` and served from `public_url`.
    Http,
}

/// Media object store settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ObjectStoreConfig {
    #[serde(default)]
    pub kind: ObjectStoreKind,
    /// Directory for the `fs` backend (defaults to `~/.waypoint/objects`).
    #[serde(default)]
    pub root: Option<String>,
    /// Base URL objects are uploaded to (`http` backend).
    #[serde(default)]
    pub upload_url: Option<String>,
    /// Base URL objects are readable from once uploaded.
    #[serde(default)]
    pub public_url: Option<String>,
}

impl ObjectStoreConfig {
    /// Resolve the `fs` backend directory.
    pub fn resolved_root(&self) -> PathBuf {
        resolve_dir(self.root.as_deref(), "objects")
    }
}

/// Sync behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Fetch and reconcile the remote set right after loading local data.
    #[serde(default = "default_true")]
    pub sync_on_start: bool,
    /// Capacity of the event broadcast channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            sync_on_start: true,
            event_buffer: default_event_buffer(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_event_buffer() -> usize {
    256
}

/// Static identity used when no identity provider is injected.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IdentityConfig {
    #[serde(default)]
    pub owner_id: Option<String>,
}

fn resolve_dir(configured: Option<&str>, leaf: &str) -> PathBuf {
    if let Some(path) = configured {
        return PathBuf::from(path);
    }
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(DEFAULT_HOME_DIR).join(leaf),
        None => PathBuf::from(DEFAULT_HOME_DIR).join(leaf),
    }
}
