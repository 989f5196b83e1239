use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::loader::{load_bytes, LoadError};
use super::model::Dataset;

/// Identity of an upload: same name, size and content digest means the same file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadKey {
    name: String,
    len: usize,
    digest: u64,
}

impl UploadKey {
    pub fn of(name: &str, bytes: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        UploadKey {
            name: name.to_string(),
            len: bytes.len(),
            digest: hasher.finish(),
        }
    }
}

/// Single-slot parse cache owned by the session.
///
/// Re-uploading an identical file returns the already parsed dataset;
/// any other upload replaces the slot.
#[derive(Debug, Default)]
pub struct DatasetCache {
    slot: Option<(UploadKey, Arc<Dataset>)>,
}

impl DatasetCache {
    pub fn get_or_load(&mut self, name: &str, bytes: &[u8]) -> Result<Arc<Dataset>, LoadError> {
        let key = UploadKey::of(name, bytes);
        if let Some((cached_key, dataset)) = &self.slot {
            if *cached_key == key {
                log::debug!("cache hit for {name}");
                return Ok(Arc::clone(dataset));
            }
        }

        self.invalidate();
        let dataset = Arc::new(load_bytes(name, bytes)?);
        self.slot = Some((key, Arc::clone(&dataset)));
        Ok(dataset)
    }

    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}
