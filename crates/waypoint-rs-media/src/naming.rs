//! File extension and content-type inference from media uris.

use regex::Regex;
use std::sync::LazyLock;
use waypoint_rs_protocol::MediaKind;

static EXTENSION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\.([A-Za-z0-9]{1,8})(?:[?#]|$)").ok());

/// Lowercased extension at the end of the uri path, ignoring any query or
/// fragment suffix.
pub fn uri_extension(uri: &str) -> Option<String> {
    EXTENSION
        .as_ref()?
        .captures(uri)
        .and_then(|captures| captures.get(1))
        .map(|ext| ext.as_str().to_ascii_lowercase())
}

/// Extension for a durable local copy: whatever the source carries, else the
/// kind default.
pub fn staging_extension(kind: MediaKind, uri: &str) -> String {
    uri_extension(uri).unwrap_or_else(|| kind.default_extension().to_string())
}

/// Extension and content type for an uploaded object.
pub fn upload_format(kind: MediaKind, uri: &str) -> (&'static str, &'static str) {
    let ext = uri_extension(uri);
    match (kind, ext.as_deref()) {
        (MediaKind::Video, Some("mov")) => ("mov", "video/quicktime"),
        (MediaKind::Video, _) => ("mp4", "video/mp4"),
        (MediaKind::Image, Some("png")) => ("png", "image/png"),
        (MediaKind::Image, Some("heic" | "heif")) => ("heic", "image/heic"),
        (MediaKind::Image, _) => ("jpg", "image/jpeg"),
    }
}

/// Deterministic object path for the media item at `index`.
pub fn remote_media_path(owner: &str, record_id: &str, index: usize, ext: &str) -> String {
    format!("owners/{owner}/records/{record_id}/media_{index}.{ext}")
}

/// Owner and record ids become path segments and must be plain names.
pub(crate) fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.starts_with('.') && !segment.contains(['/', '\\'])
}
