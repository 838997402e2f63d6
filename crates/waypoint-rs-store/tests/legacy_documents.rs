//! Local and remote stores read every persisted record shape.

use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;
use waypoint_rs_protocol::{Location, MediaItem, Record, RecordAttributes, RecordKind};
use waypoint_rs_store::{FileRecordStore, FsRemoteRecordStore, LocalRecordStore, RemoteRecordStore};

/// Sets written by older app versions load into canonical media lists.
#[test]
fn local_store_normalizes_legacy_entries() {
    let temp = tempdir().expect("tempdir");
    let store = FileRecordStore::new(temp.path(), "memories_v1").expect("store");
    fs::write(
        store.path(),
        r#"[
            {"id": 17, "uri": "file:///a.jpg", "latitude": 1, "longitude": 2, "createdAt": 10},
            {"id": "v", "type": "video", "videoUri": "file:///b.mov", "latitude": 1, "longitude": 2, "createdAt": 20},
            {"id": "n", "title": "Just words", "latitude": 1, "longitude": 2, "createdAt": 30}
        ]"#,
    )
    .expect("write");

    let records = store.load_all();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].id, "17");
    assert_eq!(records[0].media, vec![MediaItem::image("file:///a.jpg")]);
    assert_eq!(records[1].media, vec![MediaItem::video("file:///b.mov")]);
    assert_eq!(records[1].kind(), RecordKind::Video);
    assert_eq!(records[2].kind(), RecordKind::Note);

    store.save_all(&records).expect("save");
    let rewritten = fs::read_to_string(store.path()).expect("read");
    assert!(!rewritten.contains("videoUri"));
    assert_eq!(store.load_all(), records);
}

/// Remote documents in a legacy shape list like canonical ones.
#[tokio::test]
async fn remote_store_lists_legacy_documents() {
    let temp = tempdir().expect("tempdir");
    let dir = temp.path().join("owners").join("alice").join("records");
    fs::create_dir_all(&dir).expect("dir");
    fs::write(
        dir.join("old.json"),
        r#"{"id": "old", "imageUris": ["https://cdn/1.jpg"], "videoUris": ["https://cdn/2.mp4"],
            "latitude": 5, "longitude": 6, "createdAt": 40}"#,
    )
    .expect("write");
    fs::write(dir.join("broken.json"), "not json").expect("write");

    let store = FsRemoteRecordStore::new(temp.path());
    let records = store.list("alice").await.expect("list");
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].media,
        vec![
            MediaItem::image("https://cdn/1.jpg"),
            MediaItem::video("https://cdn/2.mp4")
        ]
    );
    assert!(!records[0].has_local_media());
}

/// Clearing media on a legacy remote document does not resurrect old fields.
#[tokio::test]
async fn remote_upsert_replaces_legacy_media_fields() {
    let temp = tempdir().expect("tempdir");
    let dir = temp.path().join("owners").join("alice").join("records");
    fs::create_dir_all(&dir).expect("dir");
    fs::write(
        dir.join("r1.json"),
        r#"{"id": "r1", "type": "image", "uri": "https://cdn/old.jpg",
            "imageUri": "https://cdn/old.jpg", "title": "Old trip",
            "latitude": 1, "longitude": 2, "createdAt": 50}"#,
    )
    .expect("write");

    let store = FsRemoteRecordStore::new(temp.path());
    let cleared = Record {
        id: "r1".to_string(),
        media: Vec::new(),
        attributes: RecordAttributes::default(),
        location: Location::new(1.0, 2.0),
        created_at: 50,
    };
    store.upsert("alice", &cleared).await.expect("upsert");

    let records = store.list("alice").await.expect("list");
    assert_eq!(records.len(), 1);
    assert!(records[0].media.is_empty());
    assert_eq!(records[0].kind(), RecordKind::Note);
    assert_eq!(records[0].attributes.title.as_deref(), Some("Old trip"));

    let stored = fs::read_to_string(dir.join("r1.json")).expect("read");
    assert!(!stored.contains("imageUri"));
    assert!(!stored.contains("old.jpg"));
}
