use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid thread id {id:?}: {reason}")]
    InvalidThreadId { id: String, reason: String },

    #[error("unknown message role code: {0}")]
    UnknownRole(u8),

    #[error("unknown inline data kind code: {0}")]
    UnknownInlineKind(u8),
}
