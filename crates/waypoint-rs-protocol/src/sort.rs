//! Display orderings for record lists.

use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ordering options offered by list views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Title,
    Location,
}

/// Sort by `created_at` descending. Equal timestamps keep their relative order.
pub fn sort_newest_first(records: &mut [Record]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Sort records for display using a stable sort.
pub fn sort_records(records: &mut [Record], order: SortOrder) {
    match order {
        SortOrder::Newest => sort_newest_first(records),
        SortOrder::Oldest => records.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOrder::Title => records.sort_by_key(title_key),
        SortOrder::Location => records.sort_by(compare_location),
    }
}

fn normalize(value: Option<&str>) -> String {
    value.unwrap_or_default().trim().to_lowercase()
}

fn title_key(record: &Record) -> String {
    normalize(record.attributes.title.as_deref())
}

fn location_key(record: &Record) -> String {
    let name = normalize(record.attributes.location_name.as_deref());
    if name.is_empty() {
        format!("{},{}", record.location.latitude, record.location.longitude)
    } else {
        name
    }
}

fn compare_location(a: &Record, b: &Record) -> Ordering {
    location_key(a).cmp(&location_key(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Location, RecordAttributes};
    use pretty_assertions::assert_eq;

    fn record(id: &str, created_at: i64, title: Option<&str>, place: Option<&str>) -> Record {
        Record {
            id: id.to_string(),
            media: Vec::new(),
            attributes: RecordAttributes {
                title: title.map(str::to_string),
                location_name: place.map(str::to_string),
                ..RecordAttributes::default()
            },
            location: Location::new(10.0, 20.0),
            created_at,
        }
    }

    fn ids(records: &[Record]) -> Vec<&str> {
        records.iter().map(|record| record.id.as_str()).collect()
    }

    #[test]
    fn newest_first_orders_by_created_at_descending() {
        let mut records = vec![
            record("a", 100, None, None),
            record("b", 300, None, None),
            record("c", 200, None, None),
        ];
        sort_newest_first(&mut records);
        assert_eq!(ids(&records), vec!["b", "c", "a"]);

        sort_records(&mut records, SortOrder::Oldest);
        assert_eq!(ids(&records), vec!["a", "c", "b"]);
    }

    #[test]
    fn title_and_location_orders_ignore_case() {
        let mut records = vec![
            record("a", 1, Some("zebra"), Some("Oslo")),
            record("b", 2, Some("  Apple"), None),
            record("c", 3, Some("mango"), Some("amsterdam")),
        ];
        sort_records(&mut records, SortOrder::Title);
        assert_eq!(ids(&records), vec!["b", "c", "a"]);

        sort_records(&mut records, SortOrder::Location);
        // "10,20" sorts before alphabetic names.
        assert_eq!(ids(&records), vec!["b", "c", "a"]);
    }
}
