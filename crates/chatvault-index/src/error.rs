//! Error types for the index crate.

use chatvault_store::StoreError;

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Reading thread objects or reading/writing the header object failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IndexError {
    /// The underlying store error.
    pub fn store_error(&self) -> &StoreError {
        match self {
            Self::Store(e) => e,
        }
    }
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
