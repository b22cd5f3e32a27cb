/// Errors from content store operations.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// No file at this path in this research object.
    #[error("file not found: {path} in {container}")]
    NotFound { container: String, path: String },

    /// The path is empty, absolute, or escapes the container.
    #[error("invalid path {0:?}")]
    InvalidPath(String),

    /// Sidecar metadata could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ContentError {
    fn from(e: serde_json::Error) -> Self {
        ContentError::Serialization(e.to_string())
    }
}

/// Result alias for content store operations.
pub type ContentResult<T> = Result<T, ContentError>;
