//! Device-local persistence of the full record set.

use crate::error::StoreError;
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use waypoint_rs_protocol::Record;

/// Whole-set persistence for a single device.
///
/// There is no per-record addressing: every mutation rewrites the full set.
pub trait LocalRecordStore: Send + Sync {
    /// Load every record. Absent or corrupt storage yields an empty set.
    fn load_all(&self) -> Vec<Record>;
    /// Replace the stored set atomically.
    fn save_all(&self, records: &[Record]) -> Result<(), StoreError>;
    /// Remove the stored set entirely.
    fn clear(&self) -> Result<(), StoreError>;
}

/// File-backed store holding one JSON array under `<root>/<key>.json`.
#[derive(Debug)]
pub struct FileRecordStore {
    root: PathBuf,
    key: String,
    /// Serialize writers of the set file.
    write_lock: Mutex<()>,
}

impl FileRecordStore {
    /// Create a store under the given root using `key` as the file stem.
    pub fn new(root: impl AsRef<Path>, key: impl Into<String>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        let key = key.into();
        info!(
            "initialized file record store (root={}, key={})",
            root.display(),
            key
        );
        Ok(Self {
            root,
            key,
            write_lock: Mutex::new(()),
        })
    }

    /// Path to the serialized set.
    pub fn path(&self) -> PathBuf {
        self.root.join(format!("{}.json", self.key))
    }

    fn temp_path(&self) -> PathBuf {
        self.root.join(format!("{}.json.tmp", self.key))
    }

    fn read_set(&self) -> Result<Option<Vec<Value>>, StoreError> {
        let path = self.path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

impl LocalRecordStore for FileRecordStore {
    fn load_all(&self) -> Vec<Record> {
        let entries = match self.read_set() {
            Ok(Some(entries)) => entries,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(
                    "local record set unreadable, starting empty (path={}): {err}",
                    self.path().display()
                );
                return Vec::new();
            }
        };

        let total = entries.len();
        let records: Vec<Record> = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<Record>(entry) {
                Ok(record) if !record.id.is_empty() => Some(record),
                Ok(_) => {
                    warn!("local record without id ignored");
                    None
                }
                Err(err) => {
                    warn!("invalid local record ignored: {err}");
                    None
                }
            })
            .collect();
        debug!(
            "loaded local records (loaded={}, skipped={})",
            records.len(),
            total - records.len()
        );
        records
    }

    fn save_all(&self, records: &[Record]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(records)?;
        let _guard = self.write_lock.lock();
        let temp_path = self.temp_path();
        {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, self.path())?;
        debug!("saved local records (count={})", records.len());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        match fs::remove_file(self.path()) {
            Ok(()) => {
                info!("cleared local record set (key={})", self.key);
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FileRecordStore, LocalRecordStore};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;
    use waypoint_rs_protocol::{Location, MediaItem, Record, RecordAttributes};

    fn record(id: &str, created_at: i64) -> Record {
        Record {
            id: id.to_string(),
            media: vec![MediaItem::image(format!("file:///{id}.jpg"))],
            attributes: RecordAttributes {
                title: Some(format!("title {id}")),
                ..RecordAttributes::default()
            },
            location: Location::new(52.5, 13.4),
            created_at,
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let temp = tempdir().expect("tempdir");
        let store = FileRecordStore::new(temp.path(), "memories_v1").expect("store");
        assert_eq!(store.load_all(), Vec::new());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let temp = tempdir().expect("tempdir");
        let store = FileRecordStore::new(temp.path(), "memories_v1").expect("store");
        fs::write(store.path(), "{not json").expect("write");
        assert_eq!(store.load_all(), Vec::new());
    }

    #[test]
    fn invalid_entries_are_skipped() {
        let temp = tempdir().expect("tempdir");
        let store = FileRecordStore::new(temp.path(), "memories_v1").expect("store");
        fs::write(
            store.path(),
            r#"[42, {"latitude": 1}, {"id": "ok", "createdAt": 3}]"#,
        )
        .expect("write");
        let records = store.load_all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "ok");
    }

    #[test]
    fn save_then_load_round_trips_and_is_byte_stable() {
        let temp = tempdir().expect("tempdir");
        let store = FileRecordStore::new(temp.path(), "memories_v1").expect("store");
        let records = vec![record("b", 200), record("a", 100)];
        store.save_all(&records).expect("save");
        assert_eq!(store.load_all(), records);

        let first = fs::read(store.path()).expect("read");
        store.save_all(&store.load_all()).expect("resave");
        let second = fs::read(store.path()).expect("read");
        assert_eq!(first, second);
        assert!(!temp.path().join("memories_v1.json.tmp").exists());
    }

    #[test]
    fn clear_removes_the_set() {
        let temp = tempdir().expect("tempdir");
        let store = FileRecordStore::new(temp.path(), "memories_v1").expect("store");
        store.save_all(&[record("a", 1)]).expect("save");
        store.clear().expect("clear");
        store.clear().expect("clear twice");
        assert_eq!(store.load_all(), Vec::new());
    }
}
