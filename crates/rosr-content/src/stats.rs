use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ContentError, ContentResult};

/// Digest method recorded with every checksum.
pub const DIGEST_METHOD: &str = "BLAKE3";

/// Physical properties of a stored file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalStats {
    /// Last path segment.
    pub name: String,
    /// Path relative to the research object.
    pub path: String,
    pub size: u64,
    /// Hex-encoded digest of the content.
    pub checksum: String,
    pub digest_method: String,
    pub mime_type: String,
    pub last_modified: DateTime<Utc>,
}

impl PhysicalStats {
    /// Compute stats for `bytes` stored at `path`.
    pub fn compute(path: &str, bytes: &[u8], mime_type: &str, last_modified: DateTime<Utc>) -> Self {
        Self {
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.to_string(),
            size: bytes.len() as u64,
            checksum: checksum(bytes),
            digest_method: DIGEST_METHOD.to_string(),
            mime_type: mime_type.to_string(),
            last_modified,
        }
    }
}

/// Hex BLAKE3 digest of `bytes`.
pub fn checksum(bytes: &[u8]) -> String {
    hex::encode(blake3::hash(bytes).as_bytes())
}

/// Validate a container-relative path and strip a leading `./`.
///
/// Rejects empty, absolute and parent-escaping paths.
pub fn clean_path(path: &str) -> ContentResult<String> {
    let trimmed = path.strip_prefix("./").unwrap_or(path);
    if trimmed.is_empty()
        || trimmed.starts_with('/')
        || trimmed.ends_with('/')
        || trimmed.split('/').any(|seg| seg.is_empty() || seg == "..")
    {
        return Err(ContentError::InvalidPath(path.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_fills_every_field() {
        let now = Utc::now();
        let stats = PhysicalStats::compute("dir/data.txt", b"abc", "text/plain", now);
        assert_eq!(stats.name, "data.txt");
        assert_eq!(stats.path, "dir/data.txt");
        assert_eq!(stats.size, 3);
        assert_eq!(stats.checksum, checksum(b"abc"));
        assert_eq!(stats.checksum.len(), 64);
        assert_eq!(stats.digest_method, "BLAKE3");
        assert_eq!(stats.mime_type, "text/plain");
        assert_eq!(stats.last_modified, now);
    }

    #[test]
    fn clean_path_rules() {
        assert_eq!(clean_path("a/b.txt").unwrap(), "a/b.txt");
        assert_eq!(clean_path("./a.txt").unwrap(), "a.txt");
        assert_eq!(clean_path(".ro/manifest.rdf").unwrap(), ".ro/manifest.rdf");
        for bad in ["", "/etc/passwd", "../x", "a/../../x", "a//b", "dir/"] {
            assert!(
                matches!(clean_path(bad), Err(ContentError::InvalidPath(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
