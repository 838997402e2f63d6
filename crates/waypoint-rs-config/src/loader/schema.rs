//! Schema validation helpers for Waypoint JSON5 configuration.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    ensure_allowed_keys(
        map,
        &["$schema", "storage", "media", "remote", "sync", "identity"],
        layer,
        "",
    )?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("storage") {
        validate_storage(value, layer, "storage")?;
    }
    if let Some(value) = map.get("media") {
        let media = expect_object(value, layer, "media")?;
        ensure_allowed_keys(media, &["root"], layer, "media")?;
        if let Some(value) = media.get("root") {
            expect_string(value, layer, "media.root")?;
        }
    }
    if let Some(value) = map.get("remote") {
        validate_remote(value, layer, "remote")?;
    }
    if let Some(value) = map.get("sync") {
        validate_sync(value, layer, "sync")?;
    }
    if let Some(value) = map.get("identity") {
        let identity = expect_object(value, layer, "identity")?;
        ensure_allowed_keys(identity, &["owner_id"], layer, "identity")?;
        if let Some(value) = identity.get("owner_id") {
            expect_string(value, layer, "identity.owner_id")?;
        }
    }

    Ok(())
}

/// Validate the "storage" block.
fn validate_storage(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["root", "key"], layer, path)?;
    for key in ["root", "key"] {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

/// Validate the "remote" block, including the nested object store.
fn validate_remote(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["enabled", "records_root", "objects"], layer, path)?;
    if let Some(value) = map.get("enabled") {
        expect_bool(value, layer, &join_path(path, "enabled"))?;
    }
    if let Some(value) = map.get("records_root") {
        expect_string(value, layer, &join_path(path, "records_root"))?;
    }
    if let Some(value) = map.get("objects") {
        let objects_path = join_path(path, "objects");
        let objects = expect_object(value, layer, &objects_path)?;
        ensure_allowed_keys(
            objects,
            &["kind", "root", "upload_url", "public_url"],
            layer,
            &objects_path,
        )?;
        if let Some(value) = objects.get("kind") {
            let kind_path = join_path(&objects_path, "kind");
            match value.as_str() {
                Some("fs") | Some("http") => {}
                Some(_) => {
                    return Err(invalid_field(layer, &kind_path, "expected \"fs\" or \"http\""));
                }
                None => return Err(invalid_field(layer, &kind_path, "expected string")),
            }
        }
        for key in ["root", "upload_url", "public_url"] {
            if let Some(value) = objects.get(key) {
                expect_string(value, layer, &join_path(&objects_path, key))?;
            }
        }
    }
    Ok(())
}

/// Validate the "sync" block.
fn validate_sync(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["sync_on_start", "event_buffer"], layer, path)?;
    if let Some(value) = map.get("sync_on_start") {
        expect_bool(value, layer, &join_path(path, "sync_on_start"))?;
    }
    if let Some(value) = map.get("event_buffer") {
        expect_u64(value, layer, &join_path(path, "event_buffer"))?;
    }
    Ok(())
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

/// Expect a JSON string or return a typed error.
fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.as_str().is_some() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

/// Expect a JSON boolean or return a typed error.
fn expect_bool(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if matches!(value, Value::Bool(_)) {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected bool"))
    }
}

/// Expect a non-negative JSON integer or return a typed error.
fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_field(layer, &join_path(path, key), "unknown key"));
        }
    }
    Ok(())
}

/// Join nested paths for better error messages.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-field error.
fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}
