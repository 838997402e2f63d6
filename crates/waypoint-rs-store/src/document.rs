//! Cloud document shaping: deep pruning and field merge.

use crate::error::RemoteError;
use serde_json::Value;
use waypoint_rs_protocol::Record;

/// Remove absent (`null`) values at every depth.
///
/// Remote stores reject a generic "absent" value, so optional fields must be
/// omitted entirely rather than written as null.
pub fn prune_absent(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(key, value)| (key, prune_absent(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|value| !value.is_null())
                .map(prune_absent)
                .collect(),
        ),
        other => other,
    }
}

/// Serialize a record for a remote write.
///
/// Fails if any media uri is device-local; callers must pass the cloud
/// projection.
pub fn cloud_document(record: &Record) -> Result<Value, RemoteError> {
    if let Some(item) = record.media.iter().find(|item| !item.is_remote()) {
        return Err(RemoteError::LocalMediaRejected {
            record_id: record.id.clone(),
            uri: item.uri.clone(),
        });
    }
    Ok(prune_absent(serde_json::to_value(record)?))
}

/// Merge an incoming document into an existing one.
///
/// Nested objects merge key by key; scalars and arrays are replaced. Fields
/// missing from the incoming document are left untouched.
pub fn merge_document(existing: &mut Value, incoming: &Value) {
    match (existing, incoming) {
        (Value::Object(existing_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                match existing_map.get_mut(key) {
                    Some(slot) => merge_document(slot, value),
                    None => {
                        existing_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (slot, value) => {
            *slot = value.clone();
        }
    }
}

/// Single-media fields written by older app versions.
pub const LEGACY_MEDIA_KEYS: [&str; 5] = ["uri", "imageUri", "videoUri", "imageUris", "videoUris"];

/// Merge a cloud record document into the stored one.
///
/// An incoming `media` list supersedes every legacy media field, so those are
/// removed from the stored document instead of being kept by the merge.
pub fn merge_record_document(existing: &mut Value, incoming: &Value) {
    merge_document(existing, incoming);
    if incoming.get("media").is_none() {
        return;
    }
    if let Value::Object(map) = existing {
        for key in LEGACY_MEDIA_KEYS {
            map.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{cloud_document, merge_document, merge_record_document, prune_absent};
    use crate::RemoteError;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use waypoint_rs_protocol::{Location, MediaItem, Record, RecordAttributes};

    fn record(media: Vec<MediaItem>) -> Record {
        Record {
            id: "r1".to_string(),
            media,
            attributes: RecordAttributes {
                title: Some("Trip".to_string()),
                ..RecordAttributes::default()
            },
            location: Location::new(1.0, 2.0),
            created_at: 7,
        }
    }

    #[test]
    fn prune_removes_nulls_at_every_depth() {
        let pruned = prune_absent(json!({
            "a": null,
            "b": { "c": null, "d": 1 },
            "e": [null, { "f": null, "g": "x" }]
        }));
        assert_eq!(pruned, json!({ "b": { "d": 1 }, "e": [{ "g": "x" }] }));
    }

    #[test]
    fn cloud_document_rejects_local_media() {
        let err = cloud_document(&record(vec![MediaItem::image("file:///a.jpg")]))
            .expect_err("local media");
        match err {
            RemoteError::LocalMediaRejected { record_id, uri } => {
                assert_eq!(record_id, "r1");
                assert_eq!(uri, "file:///a.jpg");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn cloud_document_has_no_absent_fields() {
        let doc = cloud_document(&record(vec![MediaItem::image("https://cdn/a.jpg")]))
            .expect("document");
        let map = doc.as_object().expect("object");
        assert!(map.values().all(|value| !value.is_null()));
        assert!(!map.contains_key("note"));
        assert_eq!(doc["media"], json!([{ "uri": "https://cdn/a.jpg", "type": "image" }]));
    }

    #[test]
    fn merge_keeps_fields_missing_from_incoming() {
        let mut existing = json!({ "title": "Old", "note": "keep", "media": [1, 2] });
        merge_document(&mut existing, &json!({ "title": "New", "media": [3] }));
        assert_eq!(
            existing,
            json!({ "title": "New", "note": "keep", "media": [3] })
        );
    }

    #[test]
    fn record_merge_drops_legacy_media_fields() {
        let mut existing = json!({
            "id": "r1",
            "uri": "https://cdn/old.jpg",
            "imageUri": "https://cdn/old.jpg",
            "imageUris": ["https://cdn/old.jpg"],
            "note": "keep"
        });
        merge_record_document(&mut existing, &json!({ "id": "r1", "media": [] }));
        assert_eq!(existing, json!({ "id": "r1", "note": "keep", "media": [] }));

        let mut untouched = json!({ "imageUri": "https://cdn/old.jpg" });
        merge_record_document(&mut untouched, &json!({ "title": "New" }));
        assert_eq!(
            untouched,
            json!({ "imageUri": "https://cdn/old.jpg", "title": "New" })
        );
    }
}
