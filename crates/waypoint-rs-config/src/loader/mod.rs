//! Layered configuration loader.
//!
//! Discovers the user, project and runtime layers, validates each against the
//! schema, merges them in precedence order, and produces a `WaypointConfig`.

mod layer_io;
mod merge;
mod schema;


use crate::{ConfigError, ObjectStoreKind, WaypointConfig};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename in every layer.
const DEFAULT_CONFIG_FILE: &str = "waypoint.json5";

/// Effective config plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The merged, validated config.
    pub config: WaypointConfig,
    /// Metadata for each layer that contributed.
    pub layers: Vec<ConfigLayer>,
}

/// Origin for a single config layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// User-specific configuration.
    User,
    /// Configuration in the working directory.
    Project,
    /// Runtime overrides (highest precedence).
    Runtime,
}

/// Metadata about a loaded config layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    pub path: PathBuf,
}

/// Options controlling layered config discovery and overrides.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Working directory used to locate the project layer.
    pub cwd: PathBuf,
    /// Optional user config path (defaults to `~/.waypoint/waypoint.json5`).
    pub user_config_path: Option<PathBuf>,
    /// Runtime override config paths applied last.
    pub runtime_paths: Vec<PathBuf>,
}

impl LayeredConfigOptions {
    /// Create options with default layer locations for the provided cwd.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            user_config_path: layer_io::default_user_config_path(),
            runtime_paths: Vec::new(),
        }
    }

    /// Add a runtime override config path that is applied last.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl WaypointConfig {
    /// Load a single config from a path (no layering).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        let value: Value = json5::from_str(&contents)?;
        config_from_value(value, "config")
    }

    /// Load a single config from JSON5 contents (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        config_from_value(value, "config")
    }

    /// Load a layered config stack using the default layer locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load a layered config stack using explicit layer locations.
    ///
    /// Layer precedence (low -> high): user, project, runtime overrides.
    /// Missing user/project files are skipped; runtime files must exist.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let mut layers = Vec::new();
        let mut merged = Value::Object(serde_json::Map::new());
        let mut seen_paths = HashSet::new();

        let mut candidates = Vec::new();
        if let Some(path) = options.user_config_path.clone() {
            candidates.push((ConfigLayerSource::User, path, false));
        }
        candidates.push((
            ConfigLayerSource::Project,
            options.cwd.join(DEFAULT_CONFIG_FILE),
            false,
        ));
        for path in &options.runtime_paths {
            candidates.push((ConfigLayerSource::Runtime, path.clone(), true));
        }

        for (source, path, required) in candidates {
            if !required && !path.exists() {
                debug!(
                    "skipping missing layer (source={:?}, path={})",
                    source,
                    path.display()
                );
                continue;
            }
            let unique = path.canonicalize().unwrap_or_else(|_| path.clone());
            if !seen_paths.insert(unique) {
                debug!(
                    "skipping duplicate layer (source={:?}, path={})",
                    source,
                    path.display()
                );
                continue;
            }
            let value = layer_io::load_layer(source, &path)?;
            merge::merge_json_values(&mut merged, &value);
            layers.push(ConfigLayer { source, path });
        }

        let config = config_from_value(merged, "effective")?;
        info!("layered config loaded (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let key = self.storage.key.trim();
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(ConfigError::InvalidField {
                path: "storage.key".to_string(),
                message: "must be a plain, non-empty file stem".to_string(),
            });
        }
        if self.sync.event_buffer == 0 {
            return Err(ConfigError::InvalidField {
                path: "sync.event_buffer".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if !self.remote.enabled {
            return Ok(());
        }

        let objects = &self.remote.objects;
        match objects.public_url.as_deref() {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {}
            Some(_) => {
                return Err(ConfigError::InvalidField {
                    path: "remote.objects.public_url".to_string(),
                    message: "must be an http(s) URL".to_string(),
                });
            }
            None => {
                return Err(ConfigError::MissingField {
                    path: "remote.objects.public_url".to_string(),
                    reason: "required when remote is enabled".to_string(),
                });
            }
        }
        if objects.kind == ObjectStoreKind::Http && objects.upload_url.is_none() {
            return Err(ConfigError::MissingField {
                path: "remote.objects.upload_url".to_string(),
                reason: "required for the http object store".to_string(),
            });
        }
        Ok(())
    }
}

fn config_from_value(value: Value, label: &str) -> Result<WaypointConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let config: WaypointConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}
