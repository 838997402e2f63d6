//! JSON export of the local record set.

use crate::error::StoreError;
use chrono::NaiveDate;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use waypoint_rs_protocol::Record;

/// File name for an export taken on `date`: `memories_YYYY-MM-DD.json`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("memories_{}.json", date.format("%Y-%m-%d"))
}

/// Write records as pretty-printed JSON into `dir` and return the file path.
pub fn export_json(
    records: &[Record],
    dir: impl AsRef<Path>,
    date: NaiveDate,
) -> Result<PathBuf, StoreError> {
    if records.is_empty() {
        return Err(StoreError::NothingToExport);
    }
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(date));
    fs::write(&path, serde_json::to_string_pretty(records)?)?;
    info!(
        "exported records (count={}, path={})",
        records.len(),
        path.display()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::{export_file_name, export_json};
    use crate::StoreError;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;
    use waypoint_rs_protocol::{Location, Record, RecordAttributes};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).expect("date")
    }

    #[test]
    fn file_name_is_zero_padded() {
        assert_eq!(export_file_name(date()), "memories_2024-03-09.json");
    }

    #[test]
    fn empty_set_is_not_exported() {
        let temp = tempdir().expect("tempdir");
        let err = export_json(&[], temp.path(), date()).expect_err("empty");
        assert!(matches!(err, StoreError::NothingToExport));
        assert!(!temp.path().join(export_file_name(date())).exists());
    }

    #[test]
    fn export_writes_readable_records() {
        let temp = tempdir().expect("tempdir");
        let records = vec![Record {
            id: "r1".to_string(),
            media: Vec::new(),
            attributes: RecordAttributes {
                title: Some("Harbor".to_string()),
                ..RecordAttributes::default()
            },
            location: Location::new(3.0, 4.0),
            created_at: 5,
        }];
        let path = export_json(&records, temp.path().join("out"), date()).expect("export");
        let contents = fs::read_to_string(&path).expect("read");
        assert!(contents.contains('\n'));
        let parsed: Vec<Record> = serde_json::from_str(&contents).expect("parse");
        assert_eq!(parsed, records);
    }
}
