use async_trait::async_trait;
use chatvault_types::{HeaderEntry, ThreadRecord};

use crate::error::SdkResult;

/// Durable storage for chat threads.
///
/// Implementations are shared across tasks as `Arc<dyn ThreadStore>`. Every
/// operation validates thread ids before touching storage.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// `{thread_id, title}` of every stored thread, ordered by `thread_id`
    /// descending. Each call returns a fresh snapshot.
    async fn list(&self) -> SdkResult<Vec<HeaderEntry>>;

    /// The stored thread, or `None` if it does not exist.
    async fn get(&self, thread_id: &str) -> SdkResult<Option<ThreadRecord>>;

    /// Store `record`, overwriting any previous version, and hand it back.
    async fn write(&self, record: ThreadRecord) -> SdkResult<ThreadRecord>;

    /// Remove a thread. Deleting a missing thread succeeds.
    async fn delete(&self, thread_id: &str) -> SdkResult<()>;

    /// The stored thread, or an empty record carrying `thread_id`.
    ///
    /// The empty record is not written.
    async fn get_or_new(&self, thread_id: &str) -> SdkResult<ThreadRecord> {
        Ok(self
            .get(thread_id)
            .await?
            .unwrap_or_else(|| ThreadRecord::new(thread_id)))
    }

    /// Rebuild any derived listing state from the stored threads.
    ///
    /// Returns the number of indexed threads, or `None` for backends that
    /// keep no index.
    async fn reindex(&self) -> SdkResult<Option<usize>> {
        Ok(None)
    }

    /// Short backend name for diagnostics.
    fn backend_name(&self) -> &'static str;
}
