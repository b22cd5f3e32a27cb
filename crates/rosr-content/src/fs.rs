use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rosr_types::Uri;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{ContentError, ContentResult};
use crate::stats::{clean_path, PhysicalStats};
use crate::traits::ContentStore;

const DATA_DIR: &str = "data";
const META_DIR: &str = "meta";
const DEFAULT_MIME: &str = "application/octet-stream";

/// Filesystem content store.
///
/// Layout under the root, per research object:
///
/// ```text
/// <blake3(ro uri)>/
///   data/<path>          file bytes
///   meta/<path>.json     PhysicalStats sidecar
/// ```
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> ContentResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened filesystem content store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn container_dir(&self, ro: &Uri) -> PathBuf {
        let digest = blake3::hash(ro.as_str().as_bytes());
        self.root.join(hex::encode(digest.as_bytes()))
    }

    fn data_path(&self, ro: &Uri, path: &str) -> PathBuf {
        self.container_dir(ro).join(DATA_DIR).join(path)
    }

    fn meta_path(&self, ro: &Uri, path: &str) -> PathBuf {
        self.container_dir(ro)
            .join(META_DIR)
            .join(format!("{path}.json"))
    }
}

/// Write via a temporary sibling and rename into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> ContentResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn remove_if_present(path: &Path) -> ContentResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

impl ContentStore for FsContentStore {
    fn put_file(
        &self,
        ro: &Uri,
        path: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> ContentResult<PhysicalStats> {
        let path = clean_path(path)?;
        let stats = PhysicalStats::compute(&path, bytes, mime_type, Utc::now());
        write_atomic(&self.data_path(ro, &path), bytes)?;
        write_atomic(&self.meta_path(ro, &path), &serde_json::to_vec_pretty(&stats)?)?;
        debug!(ro = %ro, path = %path, size = stats.size, "stored file");
        Ok(stats)
    }

    fn get_file(&self, ro: &Uri, path: &str) -> ContentResult<Vec<u8>> {
        let path = clean_path(path)?;
        fs::read(self.data_path(ro, &path)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ContentError::NotFound {
                container: ro.to_string(),
                path: path.clone(),
            },
            _ => e.into(),
        })
    }

    fn get_file_info(&self, ro: &Uri, path: &str) -> ContentResult<PhysicalStats> {
        let path = clean_path(path)?;
        match fs::read(self.meta_path(ro, &path)) {
            Ok(json) => return Ok(serde_json::from_slice(&json)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        // Bytes placed without a sidecar: derive what we can.
        let bytes = self.get_file(ro, &path)?;
        let modified: DateTime<Utc> = fs::metadata(self.data_path(ro, &path))?
            .modified()
            .map(DateTime::from)
            .unwrap_or_else(|_| Utc::now());
        warn!(ro = %ro, path = %path, "missing stats sidecar");
        Ok(PhysicalStats::compute(&path, &bytes, DEFAULT_MIME, modified))
    }

    fn delete_file(&self, ro: &Uri, path: &str) -> ContentResult<bool> {
        let path = clean_path(path)?;
        let removed = remove_if_present(&self.data_path(ro, &path))?;
        remove_if_present(&self.meta_path(ro, &path))?;
        if removed {
            debug!(ro = %ro, path = %path, "deleted file");
        }
        Ok(removed)
    }

    fn file_exists(&self, ro: &Uri, path: &str) -> ContentResult<bool> {
        let path = clean_path(path)?;
        Ok(self.data_path(ro, &path).is_file())
    }

    fn list_files(&self, ro: &Uri) -> ContentResult<Vec<String>> {
        let data_dir = self.container_dir(ro).join(DATA_DIR);
        if !data_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&data_dir) {
            let entry = entry.map_err(|e| ContentError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&data_dir) else {
                continue;
            };
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            if !relative.ends_with(".tmp") {
                files.push(relative);
            }
        }
        files.sort();
        Ok(files)
    }

    fn delete_container(&self, ro: &Uri) -> ContentResult<()> {
        match fs::remove_dir_all(self.container_dir(ro)) {
            Ok(()) => {
                debug!(ro = %ro, "deleted container");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl std::fmt::Debug for FsContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsContentStore").field("root", &self.root).finish()
    }
}
