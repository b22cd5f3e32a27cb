use rosr_content::ContentError;
use rosr_graph::GraphError;
use rosr_types::TypeError;
use thiserror::Error;

/// Coarse classification of an [`RoError`], for callers that map failures
/// onto protocol status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Conflict,
    NotFound,
    BadRequest,
    Forbidden,
    Store,
}

#[derive(Debug, Error)]
pub enum RoError {
    /// A URI or identity is already in use.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A required entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An externally supplied description is malformed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The target is system-managed or frozen.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("metadata store error: {0}")]
    Graph(#[from] GraphError),

    #[error("content store error: {0}")]
    Content(#[from] ContentError),

    #[error("invalid URI: {0}")]
    Type(#[from] TypeError),
}

impl RoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RoError::Conflict(_) => ErrorKind::Conflict,
            RoError::NotFound(_) => ErrorKind::NotFound,
            RoError::BadRequest(_) => ErrorKind::BadRequest,
            RoError::Forbidden(_) => ErrorKind::Forbidden,
            RoError::Type(_) => ErrorKind::BadRequest,
            RoError::Content(ContentError::NotFound { .. }) => ErrorKind::NotFound,
            RoError::Content(ContentError::InvalidPath(_)) => ErrorKind::BadRequest,
            RoError::Graph(GraphError::Parse { .. } | GraphError::InvalidIri { .. }) => {
                ErrorKind::BadRequest
            }
            RoError::Graph(GraphError::TransactionActive) => ErrorKind::Conflict,
            RoError::Graph(_) | RoError::Content(_) => ErrorKind::Store,
        }
    }
}

pub type RoResult<T> = Result<T, RoError>;
