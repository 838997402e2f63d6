//! Config-driven wiring of stores, media pipeline and orchestrator.

use log::{debug, info};
use std::sync::Arc;
use waypoint_rs_config::{ConfigError, ObjectStoreKind, RemoteConfig, WaypointConfig};
use waypoint_rs_core::{CloudBackend, SharedIdentity, SyncError, SyncOrchestrator};
use waypoint_rs_media::{
    FileMediaSource, FsObjectStore, HttpObjectStore, MediaSource, MediaStager, ObjectStore,
    RemoteUploader,
};
use waypoint_rs_protocol::{EventSink, Geocoder, Record};
use waypoint_rs_store::{FileRecordStore, FsRemoteRecordStore, StoreError};

/// Errors raised while opening or starting a [`Waypoint`].
#[derive(Debug, thiserror::Error)]
pub enum WaypointError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Optional collaborators supplied by the host application.
#[derive(Default, Clone)]
pub struct WaypointOptions {
    pub geocoder: Option<Arc<dyn Geocoder>>,
    pub event_sink: Option<Arc<dyn EventSink>>,
}

/// A configured sync core.
pub struct Waypoint {
    config: WaypointConfig,
    identity: Arc<SharedIdentity>,
    orchestrator: SyncOrchestrator,
}

impl Waypoint {
    pub fn open(config: WaypointConfig) -> Result<Self, WaypointError> {
        Self::open_with(config, WaypointOptions::default())
    }

    pub fn open_with(config: WaypointConfig, options: WaypointOptions) -> Result<Self, WaypointError> {
        config.validate()?;
        let storage_root = config.storage.resolved_root();
        let local = Arc::new(FileRecordStore::new(&storage_root, config.storage.key.clone())?);
        let source: Arc<dyn MediaSource> = Arc::new(FileMediaSource);
        let stager = MediaStager::new(config.media.resolved_root(), source.clone());
        let identity = Arc::new(SharedIdentity::new(config.identity.owner_id.clone()));

        let mut builder = SyncOrchestrator::builder(local, stager, identity.clone())
            .event_buffer(config.sync.event_buffer);
        if config.remote.enabled {
            builder = builder.cloud(cloud_backend(&config.remote, source)?);
        }
        if let Some(geocoder) = options.geocoder {
            builder = builder.geocoder(geocoder);
        }
        if let Some(sink) = options.event_sink {
            builder = builder.event_sink(sink);
        }
        info!(
            "waypoint opened (storage={}, remote={}, owner_set={})",
            storage_root.display(),
            config.remote.enabled,
            config.identity.owner_id.is_some()
        );
        Ok(Self {
            config,
            identity,
            orchestrator: builder.build(),
        })
    }

    /// Load local records and, when configured, reconcile with the cloud.
    pub async fn start(&self) -> Result<Vec<Record>, WaypointError> {
        if self.config.sync.sync_on_start {
            Ok(self.orchestrator.start().await?)
        } else {
            debug!("sync on start disabled, loading local records only");
            Ok(self.orchestrator.load_local().await)
        }
    }

    pub fn orchestrator(&self) -> &SyncOrchestrator {
        &self.orchestrator
    }

    /// Identity handle for sign-in and sign-out.
    pub fn identity(&self) -> &Arc<SharedIdentity> {
        &self.identity
    }

    pub fn config(&self) -> &WaypointConfig {
        &self.config
    }
}

fn cloud_backend(
    remote: &RemoteConfig,
    source: Arc<dyn MediaSource>,
) -> Result<CloudBackend, ConfigError> {
    let public_url = remote
        .objects
        .public_url
        .clone()
        .ok_or_else(|| ConfigError::MissingField {
            path: "remote.objects.public_url".to_string(),
            reason: "required when remote is enabled".to_string(),
        })?;
    let objects: Arc<dyn ObjectStore> = match remote.objects.kind {
        ObjectStoreKind::Fs => Arc::new(FsObjectStore::new(
            remote.objects.resolved_root(),
            public_url,
        )),
        ObjectStoreKind::Http => {
            let upload_url =
                remote
                    .objects
                    .upload_url
                    .clone()
                    .ok_or_else(|| ConfigError::MissingField {
                        path: "remote.objects.upload_url".to_string(),
                        reason: "required for the http object store".to_string(),
                    })?;
            Arc::new(HttpObjectStore::new(upload_url, public_url))
        }
    };
    debug!(
        "cloud backend configured (objects={:?}, records_root={})",
        remote.objects.kind,
        remote.resolved_records_root().display()
    );
    Ok(CloudBackend {
        records: Arc::new(FsRemoteRecordStore::new(remote.resolved_records_root())),
        uploader: RemoteUploader::new(source, objects),
    })
}
