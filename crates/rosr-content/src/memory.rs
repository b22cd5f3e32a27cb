use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use chrono::Utc;
use rosr_types::Uri;
use tracing::debug;

use crate::error::{ContentError, ContentResult};
use crate::stats::{clean_path, PhysicalStats};
use crate::traits::ContentStore;

struct StoredFile {
    bytes: Vec<u8>,
    stats: PhysicalStats,
}

/// In-memory content store for tests and embedding.
pub struct InMemoryContentStore {
    containers: RwLock<HashMap<Uri, BTreeMap<String, StoredFile>>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(HashMap::new()),
        }
    }

    /// Number of non-empty containers.
    pub fn container_count(&self) -> usize {
        self.containers
            .read()
            .map(|c| c.values().filter(|files| !files.is_empty()).count())
            .unwrap_or(0)
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(ro: &Uri, path: &str) -> ContentError {
    ContentError::NotFound {
        container: ro.to_string(),
        path: path.to_string(),
    }
}

impl ContentStore for InMemoryContentStore {
    fn put_file(
        &self,
        ro: &Uri,
        path: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> ContentResult<PhysicalStats> {
        let path = clean_path(path)?;
        let stats = PhysicalStats::compute(&path, bytes, mime_type, Utc::now());
        let mut containers = self.containers.write().map_err(|_| ContentError::LockPoisoned)?;
        containers.entry(ro.clone()).or_default().insert(
            path.clone(),
            StoredFile {
                bytes: bytes.to_vec(),
                stats: stats.clone(),
            },
        );
        debug!(ro = %ro, path = %path, size = stats.size, "stored file");
        Ok(stats)
    }

    fn get_file(&self, ro: &Uri, path: &str) -> ContentResult<Vec<u8>> {
        let path = clean_path(path)?;
        let containers = self.containers.read().map_err(|_| ContentError::LockPoisoned)?;
        containers
            .get(ro)
            .and_then(|files| files.get(&path))
            .map(|file| file.bytes.clone())
            .ok_or_else(|| not_found(ro, &path))
    }

    fn get_file_info(&self, ro: &Uri, path: &str) -> ContentResult<PhysicalStats> {
        let path = clean_path(path)?;
        let containers = self.containers.read().map_err(|_| ContentError::LockPoisoned)?;
        containers
            .get(ro)
            .and_then(|files| files.get(&path))
            .map(|file| file.stats.clone())
            .ok_or_else(|| not_found(ro, &path))
    }

    fn delete_file(&self, ro: &Uri, path: &str) -> ContentResult<bool> {
        let path = clean_path(path)?;
        let mut containers = self.containers.write().map_err(|_| ContentError::LockPoisoned)?;
        let removed = containers
            .get_mut(ro)
            .map(|files| files.remove(&path).is_some())
            .unwrap_or(false);
        if removed {
            debug!(ro = %ro, path = %path, "deleted file");
        }
        Ok(removed)
    }

    fn file_exists(&self, ro: &Uri, path: &str) -> ContentResult<bool> {
        let path = clean_path(path)?;
        let containers = self.containers.read().map_err(|_| ContentError::LockPoisoned)?;
        Ok(containers
            .get(ro)
            .map(|files| files.contains_key(&path))
            .unwrap_or(false))
    }

    fn list_files(&self, ro: &Uri) -> ContentResult<Vec<String>> {
        let containers = self.containers.read().map_err(|_| ContentError::LockPoisoned)?;
        Ok(containers
            .get(ro)
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn delete_container(&self, ro: &Uri) -> ContentResult<()> {
        let mut containers = self.containers.write().map_err(|_| ContentError::LockPoisoned)?;
        if let Some(files) = containers.remove(ro) {
            debug!(ro = %ro, files = files.len(), "deleted container");
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContentStore")
            .field("container_count", &self.container_count())
            .finish()
    }
}
