use async_trait::async_trait;
use bytes::Bytes;

use crate::error::BlobResult;

/// Transport capability over a single flat namespace of named byte blobs.
///
/// This is the only thing the thread store requires of its backing object
/// storage. All implementations must satisfy these invariants:
/// - `get` of a missing key returns `Ok(None)`, distinguishable from failure.
/// - `put` overwrites unconditionally.
/// - `delete` of a missing key returns `Ok(false)`.
/// - The transport never interprets blob contents.
///
/// Any call may fail transiently; callers wrap calls in a
/// [`RetryPolicy`](crate::RetryPolicy).
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch the blob stored under `key`.
    async fn get(&self, key: &str) -> BlobResult<Option<Bytes>>;

    /// Store `data` under `key`, replacing any previous content.
    async fn put(&self, key: &str, data: Bytes) -> BlobResult<()>;

    /// Remove the blob under `key`. Returns `true` if it existed.
    async fn delete(&self, key: &str) -> BlobResult<bool>;

    /// List every key that starts with `prefix`, in ascending order.
    ///
    /// Pass `""` to list the whole namespace.
    async fn list(&self, prefix: &str) -> BlobResult<Vec<String>>;
}
