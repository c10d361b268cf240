use std::path::PathBuf;

use chatvault_index::IndexError;
use chatvault_store::{BlobError, CodecError, StoreError};
use chatvault_types::TypeError;
use thiserror::Error;

/// Errors returned by [`ThreadStore`](crate::ThreadStore) operations and
/// store construction.
///
/// Store and index failures are flattened into one taxonomy so callers can
/// match on the failure class without caring which layer raised it.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(#[from] TypeError),

    #[error("corrupt record {key}: {reason}")]
    CorruptRecord { key: String, reason: String },

    #[error("store unavailable for {key} after {attempts} attempt(s): {source}")]
    Unavailable {
        key: String,
        attempts: u32,
        #[source]
        source: BlobError,
    },

    #[error("encode error for {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: CodecError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SdkError {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptRecord { .. })
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    pub fn is_invalid_identifier(&self) -> bool {
        matches!(self, Self::InvalidIdentifier(_))
    }
}

impl From<StoreError> for SdkError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidIdentifier(e) => Self::InvalidIdentifier(e),
            StoreError::CorruptRecord { key, reason } => Self::CorruptRecord { key, reason },
            StoreError::Unavailable {
                key,
                attempts,
                source,
            } => Self::Unavailable {
                key,
                attempts,
                source,
            },
            StoreError::Encode { key, source } => Self::Encode { key, source },
        }
    }
}

impl From<IndexError> for SdkError {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::Store(e) => e.into(),
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
