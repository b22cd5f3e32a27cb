/// Errors from metadata store operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The N-Triples input could not be parsed.
    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// An IRI could not be resolved to an absolute URI.
    #[error("invalid IRI {iri:?}: {reason}")]
    InvalidIri { iri: String, reason: String },

    /// The session already has a transaction open, or another session's
    /// transaction excludes the requested one.
    #[error("a transaction is already active")]
    TransactionActive,

    /// Commit/abort/end called without an open transaction.
    #[error("no active transaction")]
    NoTransaction,

    /// Write attempted inside a read transaction.
    #[error("write attempted in a read transaction")]
    ReadOnlyTransaction,

    /// The backend does not implement the requested capability.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for metadata store operations.
pub type GraphResult<T> = Result<T, GraphError>;
