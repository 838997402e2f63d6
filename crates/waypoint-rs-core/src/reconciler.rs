//! Merge of local and remote record sets.

use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use waypoint_rs_protocol::{Record, sort_newest_first};
use waypoint_rs_store::{LocalRecordStore, StoreError};

/// Merge a local and a remote set into one, newest first.
///
/// Remote wins on metadata. When the local entry still points at on-device
/// media and the remote one does not, the local media list is kept so the
/// device never loses a renderable file. Re-merging the output with the same
/// remote set returns it unchanged.
pub fn merge(local: &[Record], remote: &[Record]) -> Vec<Record> {
    let mut merged: Vec<Record> = local.to_vec();
    let mut positions: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(position, record)| (record.id.clone(), position))
        .collect();

    for incoming in remote {
        match positions.get(&incoming.id) {
            None => {
                positions.insert(incoming.id.clone(), merged.len());
                merged.push(incoming.clone());
            }
            Some(&position) => {
                let existing = &merged[position];
                let replacement = if existing.has_local_media() && !incoming.has_local_media() {
                    Record {
                        media: existing.media.clone(),
                        ..incoming.clone()
                    }
                } else {
                    incoming.clone()
                };
                merged[position] = replacement;
            }
        }
    }

    sort_newest_first(&mut merged);
    merged
}

/// Applies [`merge`] and writes the result through to local storage.
#[derive(Clone)]
pub struct Reconciler {
    local: Arc<dyn LocalRecordStore>,
}

impl Reconciler {
    pub fn new(local: Arc<dyn LocalRecordStore>) -> Self {
        Self { local }
    }

    pub fn reconcile(&self, local: &[Record], remote: &[Record]) -> Result<Vec<Record>, StoreError> {
        let merged = merge(local, remote);
        self.local.save_all(&merged)?;
        debug!(
            "reconciled records (local={}, remote={}, merged={})",
            local.len(),
            remote.len(),
            merged.len()
        );
        Ok(merged)
    }
}
