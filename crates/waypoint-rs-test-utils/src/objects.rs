use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use waypoint_rs_media::{MediaError, ObjectStore};

/// Public URL prefix for objects stored by [`FlakyObjectStore`].
pub const OBJECT_BASE_URL: &str = "https://objects.test";

/// In-memory object store that fails puts for chosen media indices.
#[derive(Default)]
pub struct FlakyObjectStore {
    failing: HashSet<usize>,
    objects: Mutex<BTreeMap<String, (Vec<u8>, String)>>,
    puts: Mutex<usize>,
}

impl FlakyObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every put whose path ends in `media_<index>.<ext>` for these indices.
    pub fn failing(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            failing: indices.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Number of put attempts, failed ones included.
    pub fn puts(&self) -> usize {
        *self.puts.lock()
    }

    pub fn paths(&self) -> Vec<String> {
        self.objects.lock().keys().cloned().collect()
    }

    pub fn content_type(&self, path: &str) -> Option<String> {
        self.objects
            .lock()
            .get(path)
            .map(|(_, content_type)| content_type.clone())
    }
}

fn media_index(path: &str) -> Option<usize> {
    let name = path.rsplit('/').next()?;
    let stem = name.strip_prefix("media_")?;
    stem.split('.').next()?.parse().ok()
}

#[async_trait]
impl ObjectStore for FlakyObjectStore {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, MediaError> {
        *self.puts.lock() += 1;
        if media_index(path).is_some_and(|index| self.failing.contains(&index)) {
            return Err(MediaError::Transport(format!("simulated failure for {path}")));
        }
        self.objects
            .lock()
            .insert(path.to_string(), (bytes, content_type.to_string()));
        Ok(format!("{OBJECT_BASE_URL}/{path}"))
    }
}
