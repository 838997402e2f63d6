//! Config-driven wiring over filesystem backends.

use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;
use waypoint_rs::config::{ObjectStoreConfig, ObjectStoreKind, RemoteConfig, WaypointConfig};
use waypoint_rs::core::RemoteOutcome;
use waypoint_rs::protocol::{Draft, Location, MediaItem, SaveStatus};
use waypoint_rs::{Waypoint, WaypointError};

fn config_for(root: &std::path::Path, extra: &str) -> WaypointConfig {
    let contents = format!(
        r#"{{
            storage: {{ root: "{root}/data" }},
            media: {{ root: "{root}/media" }},
            remote: {{
                enabled: true,
                records_root: "{root}/remote",
                objects: {{ kind: "fs", root: "{root}/objects", public_url: "https://cdn.test" }},
            }},
            {extra}
        }}"#,
        root = root.display()
    );
    WaypointConfig::load_from_str(&contents).expect("config")
}

#[tokio::test]
async fn save_flows_through_every_backend() {
    let temp = tempdir().expect("tempdir");
    let root = temp.path();
    let photo = root.join("photo.png");
    fs::write(&photo, b"png").expect("photo");

    let waypoint =
        Waypoint::open(config_for(root, r#"identity: { owner_id: "alice" }"#)).expect("open");
    assert_eq!(waypoint.start().await.expect("start"), Vec::new());

    let draft = Draft::new(Location::new(35.0, 139.0))
        .with_title("Shrine")
        .with_media(MediaItem::image(photo.display().to_string()));
    let receipt = waypoint.orchestrator().save(draft).await.expect("save");
    assert_eq!(receipt.status, SaveStatus::Complete);
    assert_eq!(
        receipt.remote.wait().await.expect("remote"),
        RemoteOutcome::Committed
    );

    let id = receipt.record.id.clone();
    let object = root
        .join("objects/owners/alice/records")
        .join(&id)
        .join("media_0.png");
    assert_eq!(fs::read(object).expect("object"), b"png");
    let document = root
        .join("remote/owners/alice/records")
        .join(format!("{id}.json"));
    let document = fs::read_to_string(document).expect("document");
    assert!(document.contains(&format!("https://cdn.test/owners/alice/records/{id}/media_0.png")));
    assert!(!document.contains("file://"));

    let reopened =
        Waypoint::open(config_for(root, r#"identity: { owner_id: "alice" }"#)).expect("reopen");
    let records = reopened.start().await.expect("start");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].media, receipt.record.media);
}

#[tokio::test]
async fn sync_on_start_can_be_disabled() {
    let temp = tempdir().expect("tempdir");
    let root = temp.path();
    let remote_dir = root.join("remote/owners/alice/records");
    fs::create_dir_all(&remote_dir).expect("remote dir");
    fs::write(
        remote_dir.join("cloud.json"),
        r#"{"id": "cloud", "latitude": 0, "longitude": 0, "createdAt": 1}"#,
    )
    .expect("document");

    let config = config_for(
        root,
        r#"identity: { owner_id: "alice" }, sync: { sync_on_start: false }"#,
    );
    let waypoint = Waypoint::open(config).expect("open");
    assert_eq!(waypoint.start().await.expect("start"), Vec::new());

    waypoint.orchestrator().sync_remote().await.expect("sync");
    assert_eq!(waypoint.orchestrator().list().await.len(), 1);
}

#[test]
fn http_objects_require_upload_url() {
    let config = WaypointConfig::builder()
        .remote(RemoteConfig {
            enabled: true,
            records_root: None,
            objects: ObjectStoreConfig {
                kind: ObjectStoreKind::Http,
                public_url: Some("https://cdn.test".to_string()),
                ..ObjectStoreConfig::default()
            },
        })
        .owner_id("alice")
        .build();
    let err = Waypoint::open(config).err().expect("missing upload url");
    assert!(matches!(err, WaypointError::Config(_)));
}
