use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid URI {input:?}: {reason}")]
    InvalidUri { input: String, reason: String },

    #[error("unknown evolution class: {0}")]
    UnknownEvoType(String),

    #[error("unknown role: {0}")]
    UnknownRole(String),
}
