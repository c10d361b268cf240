use chatvault_types::TypeError;

/// Errors raised by a single blob transport call.
///
/// Every variant is treated as transient by [`RetryPolicy`](crate::RetryPolicy).
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// Network or service failure reported by the backing store.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The key cannot be mapped onto this backend.
    #[error("invalid object key {0:?}")]
    InvalidKey(String),

    /// I/O error from a filesystem-backed transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for blob transport calls.
pub type BlobResult<T> = Result<T, BlobError>;

/// Errors from the gzip JSON codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("serialization failed: {0}")]
    Serialize(String),

    #[error("compression failed: {0}")]
    Compress(String),

    #[error("decompression failed: {0}")]
    Decompress(String),

    #[error("malformed document: {0}")]
    Malformed(String),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors from thread object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The thread id failed validation; no I/O was attempted.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(#[from] TypeError),

    /// An object exists but cannot be decoded.
    #[error("corrupt record {key}: {reason}")]
    CorruptRecord { key: String, reason: String },

    /// A record could not be encoded for upload.
    #[error("encode error for {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: CodecError,
    },

    /// The transport kept failing until the retry bound was reached.
    #[error("store unavailable for {key} after {attempts} attempt(s): {source}")]
    Unavailable {
        key: String,
        attempts: u32,
        #[source]
        source: BlobError,
    },
}

impl StoreError {
    /// Returns `true` for the decode failure class.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptRecord { .. })
    }

    /// Returns `true` when retries were exhausted.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
