//! Persisted document shape and legacy normalization.
//!
//! Older builds stored a single `uri`/`imageUri`/`videoUri` or parallel
//! `imageUris`/`videoUris` arrays instead of `media`. Everything funnels into
//! the canonical [`Record`] here and nowhere else.

use crate::record::{Location, MediaItem, MediaKind, Record, RecordAttributes};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct MediaDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uri: Option<String>,
    #[serde(
        rename = "type",
        alias = "kind",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    kind: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecordDoc {
    #[serde(default, deserialize_with = "string_or_number")]
    id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    media: Option<Vec<MediaDoc>>,
    #[serde(default, skip_serializing)]
    uri: Option<String>,
    #[serde(default, skip_serializing)]
    image_uri: Option<String>,
    #[serde(default, skip_serializing)]
    video_uri: Option<String>,
    #[serde(default, skip_serializing)]
    image_uris: Option<Vec<String>>,
    #[serde(default, skip_serializing)]
    video_uris: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location_name: Option<String>,
    #[serde(default)]
    latitude: f64,
    #[serde(default)]
    longitude: f64,
    #[serde(default)]
    created_at: i64,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => value,
        Value::Number(value) => value.to_string(),
        _ => String::new(),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn media_kind(raw: Option<&str>) -> MediaKind {
    match raw {
        Some("video") => MediaKind::Video,
        _ => MediaKind::Image,
    }
}

impl RecordDoc {
    fn normalized_media(&mut self) -> Vec<MediaItem> {
        let media: Vec<MediaItem> = self
            .media
            .take()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|doc| {
                let kind = media_kind(doc.kind.as_deref());
                non_blank(doc.uri).map(|uri| MediaItem::new(uri, kind))
            })
            .collect();
        if !media.is_empty() {
            return media;
        }

        let images = self.image_uris.take().unwrap_or_default();
        let videos = self.video_uris.take().unwrap_or_default();
        let listed: Vec<MediaItem> = images
            .into_iter()
            .filter(|uri| !uri.trim().is_empty())
            .map(MediaItem::image)
            .chain(
                videos
                    .into_iter()
                    .filter(|uri| !uri.trim().is_empty())
                    .map(MediaItem::video),
            )
            .collect();
        if !listed.is_empty() {
            return listed;
        }

        if let Some(uri) = non_blank(self.image_uri.take()) {
            vec![MediaItem::image(uri)]
        } else if let Some(uri) = non_blank(self.video_uri.take()) {
            vec![MediaItem::video(uri)]
        } else if let Some(uri) = non_blank(self.uri.take()) {
            vec![MediaItem::image(uri)]
        } else {
            Vec::new()
        }
    }
}

impl From<RecordDoc> for Record {
    fn from(mut doc: RecordDoc) -> Self {
        let media = doc.normalized_media();
        Record {
            id: doc.id,
            media,
            attributes: RecordAttributes {
                title: doc.title,
                note: doc.note,
                description: doc.description,
                date: doc.date,
                location_name: doc.location_name,
            },
            location: Location::new(doc.latitude, doc.longitude),
            created_at: doc.created_at,
        }
    }
}

impl From<Record> for RecordDoc {
    fn from(record: Record) -> Self {
        let kind = record.kind().as_str().to_string();
        let media = record
            .media
            .into_iter()
            .map(|item| MediaDoc {
                uri: Some(item.uri),
                kind: Some(item.kind.as_str().to_string()),
            })
            .collect();
        RecordDoc {
            id: record.id,
            kind: Some(kind),
            media: Some(media),
            title: record.attributes.title,
            note: record.attributes.note,
            description: record.attributes.description,
            date: record.attributes.date,
            location_name: record.attributes.location_name,
            latitude: record.location.latitude,
            longitude: record.location.longitude,
            created_at: record.created_at,
            ..RecordDoc::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{MediaItem, Record, RecordKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn canonical_document_omits_absent_fields() {
        let record: Record = serde_json::from_value(json!({
            "id": "1",
            "media": [{ "uri": "file:///a.jpg", "type": "image" }],
            "title": "Beach",
            "latitude": 1.5,
            "longitude": 2.5,
            "createdAt": 100
        }))
        .expect("record");
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(
            value,
            json!({
                "id": "1",
                "type": "image",
                "media": [{ "uri": "file:///a.jpg", "type": "image" }],
                "title": "Beach",
                "latitude": 1.5,
                "longitude": 2.5,
                "createdAt": 100
            })
        );
    }

    #[test]
    fn legacy_single_uri_fields_become_media() {
        let record: Record = serde_json::from_value(json!({
            "id": 1700000000000u64,
            "type": "video",
            "uri": "file:///v.mov",
            "videoUri": "file:///v.mov",
            "imageUri": null,
            "latitude": 0.0,
            "longitude": 0.0,
            "createdAt": 5
        }))
        .expect("record");
        assert_eq!(record.id, "1700000000000");
        assert_eq!(record.media, vec![MediaItem::video("file:///v.mov")]);
        assert_eq!(record.kind(), RecordKind::Video);
    }

    #[test]
    fn legacy_uri_lists_keep_images_before_videos() {
        let record: Record = serde_json::from_value(json!({
            "id": "x",
            "imageUris": ["a.jpg", ""],
            "videoUris": ["b.mp4"],
        }))
        .expect("record");
        assert_eq!(
            record.media,
            vec![MediaItem::image("a.jpg"), MediaItem::video("b.mp4")]
        );
        assert_eq!(record.created_at, 0);
    }

    #[test]
    fn media_entries_without_uri_are_dropped_and_unknown_kinds_are_images() {
        let record: Record = serde_json::from_value(json!({
            "id": "x",
            "media": [
                { "uri": "", "type": "image" },
                { "type": "video" },
                { "uri": "c.gif", "kind": "animation" },
                { "uri": "d.mp4", "kind": "video" }
            ]
        }))
        .expect("record");
        assert_eq!(
            record.media,
            vec![MediaItem::image("c.gif"), MediaItem::video("d.mp4")]
        );
    }

    #[test]
    fn stale_type_field_is_recomputed_from_media() {
        let record: Record = serde_json::from_value(json!({
            "id": "x",
            "type": "image",
            "media": []
        }))
        .expect("record");
        assert_eq!(record.kind(), RecordKind::Note);
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["type"], json!("note"));
    }
}
