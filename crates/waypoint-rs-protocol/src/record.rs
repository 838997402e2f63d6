//! Canonical record model and its local/cloud projections.

use crate::legacy::RecordDoc;
use serde::{Deserialize, Serialize};

/// Opaque record identifier, stable for the lifetime of the record.
pub type RecordId = String;
/// Authenticated identity that scopes remote records and media.
pub type OwnerId = String;

/// Returns true when the uri points at a remote object (`http://` or `https://`).
pub fn is_remote_uri(uri: &str) -> bool {
    let has_prefix = |prefix: &str| {
        uri.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    };
    has_prefix("http://") || has_prefix("https://")
}

/// Kind of a single attached media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    /// Extension used when nothing can be inferred from the source uri.
    pub fn default_extension(&self) -> &'static str {
        match self {
            MediaKind::Image => "jpg",
            MediaKind::Video => "mp4",
        }
    }
}

/// Record kind derived from its media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Image,
    Video,
    Note,
}

impl RecordKind {
    /// Image takes precedence over video; no media means a note.
    pub fn from_media(media: &[MediaItem]) -> Self {
        if media.iter().any(|item| item.kind == MediaKind::Image) {
            RecordKind::Image
        } else if media.iter().any(|item| item.kind == MediaKind::Video) {
            RecordKind::Video
        } else {
            RecordKind::Note
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Image => "image",
            RecordKind::Video => "video",
            RecordKind::Note => "note",
        }
    }
}

/// A single attached media reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaItem {
    pub uri: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

impl MediaItem {
    pub fn new(uri: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            uri: uri.into(),
            kind,
        }
    }

    pub fn image(uri: impl Into<String>) -> Self {
        Self::new(uri, MediaKind::Image)
    }

    pub fn video(uri: impl Into<String>) -> Self {
        Self::new(uri, MediaKind::Video)
    }

    pub fn is_remote(&self) -> bool {
        is_remote_uri(&self.uri)
    }
}

/// Geographic anchor of a record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True for finite coordinates within latitude ±90 and longitude ±180.
    ///
    /// Non-finite values serialize as `null` and could not be read back.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= 90.0
            && self.longitude.abs() <= 180.0
    }
}

/// Caller-supplied metadata, replaced wholesale on edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAttributes {
    pub title: Option<String>,
    pub note: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub location_name: Option<String>,
}

/// A memory pinned to a coordinate.
///
/// Serialization always produces the canonical camelCase document shape and
/// deserialization accepts every legacy shape (single `uri`, `imageUri`,
/// `videoUri`, `imageUris`/`videoUris`), normalizing into `media`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecordDoc", into = "RecordDoc")]
pub struct Record {
    pub id: RecordId,
    pub media: Vec<MediaItem>,
    pub attributes: RecordAttributes,
    pub location: Location,
    /// Milliseconds since the epoch, set once at first creation.
    pub created_at: i64,
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        RecordKind::from_media(&self.media)
    }

    /// True if any media uri is a non-http (device-local) reference.
    pub fn has_local_media(&self) -> bool {
        self.media.iter().any(|item| !item.is_remote())
    }

    /// First media item, used as the preview source.
    pub fn thumbnail(&self) -> Option<&MediaItem> {
        self.media.first()
    }

    /// Projection safe to write to the remote store: remote media only.
    pub fn cloud_projection(&self) -> Record {
        Record {
            media: self
                .media
                .iter()
                .filter(|item| item.is_remote())
                .cloned()
                .collect(),
            ..self.clone()
        }
    }
}

/// Unsaved user edit session for a new or existing record.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    /// Existing record id when editing; `None` allocates a fresh id.
    pub id: Option<RecordId>,
    pub media: Vec<MediaItem>,
    pub attributes: RecordAttributes,
    pub location: Location,
}

impl Draft {
    pub fn new(location: Location) -> Self {
        Self {
            id: None,
            media: Vec::new(),
            attributes: RecordAttributes::default(),
            location,
        }
    }

    pub fn editing(id: impl Into<RecordId>, location: Location) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::new(location)
        }
    }

    pub fn with_media(mut self, item: MediaItem) -> Self {
        self.media.push(item);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.attributes.title = Some(title.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.attributes.note = Some(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(media: Vec<MediaItem>) -> Record {
        Record {
            id: "r1".to_string(),
            media,
            attributes: RecordAttributes::default(),
            location: Location::new(1.0, 2.0),
            created_at: 10,
        }
    }

    #[test]
    fn remote_uri_detection_is_case_insensitive() {
        assert!(is_remote_uri("https://cdn/a.jpg"));
        assert!(is_remote_uri("HTTP://cdn/a.jpg"));
        assert!(!is_remote_uri("file:///data/a.jpg"));
        assert!(!is_remote_uri("content://media/1"));
        assert!(!is_remote_uri("http"));
    }

    #[test]
    fn kind_prefers_image_over_video() {
        let media = vec![MediaItem::video("a.mp4"), MediaItem::image("b.jpg")];
        assert_eq!(RecordKind::from_media(&media), RecordKind::Image);
        assert_eq!(
            RecordKind::from_media(&[MediaItem::video("a.mp4")]),
            RecordKind::Video
        );
        assert_eq!(RecordKind::from_media(&[]), RecordKind::Note);
    }

    #[test]
    fn cloud_projection_drops_local_uris() {
        let record = record(vec![
            MediaItem::image("file:///a.jpg"),
            MediaItem::image("https://cdn/b.jpg"),
            MediaItem::video("/data/c.mp4"),
        ]);
        let cloud = record.cloud_projection();
        assert_eq!(cloud.media, vec![MediaItem::image("https://cdn/b.jpg")]);
        assert!(!cloud.has_local_media());
        assert!(record.has_local_media());
        assert_eq!(cloud.id, record.id);
        assert_eq!(cloud.created_at, record.created_at);
    }

    #[test]
    fn location_validity_requires_finite_in_range_coordinates() {
        assert!(Location::new(-90.0, 180.0).is_valid());
        assert!(!Location::new(f64::NAN, 0.0).is_valid());
        assert!(!Location::new(0.0, f64::INFINITY).is_valid());
        assert!(!Location::new(90.5, 0.0).is_valid());
    }
}
