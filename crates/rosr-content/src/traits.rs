//! The [`ContentStore`] trait defining the content storage interface.

use rosr_types::Uri;

use crate::error::ContentResult;
use crate::stats::PhysicalStats;

/// Storage backend for the bytes of internal resources.
///
/// Files are addressed by the URI of their research object (the container)
/// and a path relative to it. Implementations must be thread-safe.
pub trait ContentStore: Send + Sync {
    /// Create or overwrite a file and return its stats.
    fn put_file(&self, ro: &Uri, path: &str, bytes: &[u8], mime_type: &str)
        -> ContentResult<PhysicalStats>;

    /// Read a file's bytes. `ContentError::NotFound` if absent.
    fn get_file(&self, ro: &Uri, path: &str) -> ContentResult<Vec<u8>>;

    /// Read a file's stats. `ContentError::NotFound` if absent.
    fn get_file_info(&self, ro: &Uri, path: &str) -> ContentResult<PhysicalStats>;

    /// Delete a file. Returns `Ok(false)` if it did not exist.
    fn delete_file(&self, ro: &Uri, path: &str) -> ContentResult<bool>;

    fn file_exists(&self, ro: &Uri, path: &str) -> ContentResult<bool>;

    /// Paths of all files in the container, sorted.
    fn list_files(&self, ro: &Uri) -> ContentResult<Vec<String>>;

    /// Delete the container and everything in it. An absent or empty
    /// container is not an error.
    fn delete_container(&self, ro: &Uri) -> ContentResult<()>;
}
