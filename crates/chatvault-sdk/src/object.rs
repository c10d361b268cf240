//! Object-store backend with a header index.

use std::sync::Arc;

use async_trait::async_trait;
use chatvault_index::HeaderIndex;
use chatvault_store::{BlobStore, ObjectKeys, ThreadObjects};
use chatvault_types::{HeaderEntry, ThreadRecord};
use tracing::{info, warn};

use crate::error::SdkResult;
use crate::store::ThreadStore;

/// Threads stored as `{prefix}{thread_id}.json.gz` objects in a blob
/// namespace, listed through a [`HeaderIndex`].
///
/// `write` and `delete` are two steps: the thread object first, then the
/// index. When the second step fails the object change stays in place and
/// the error is returned; the header catches up on the next successful
/// mutation or rebuild.
pub struct ObjectThreadStore {
    objects: Arc<ThreadObjects>,
    index: HeaderIndex,
}

impl ObjectThreadStore {
    /// Store threads in `blobs` under `prefix` with the default retry
    /// policies.
    pub fn new(blobs: Arc<dyn BlobStore>, prefix: Option<&str>) -> Self {
        Self::from_objects(ThreadObjects::new(blobs, ObjectKeys::new(prefix)))
    }

    /// Wrap a preconfigured [`ThreadObjects`].
    pub fn from_objects(objects: ThreadObjects) -> Self {
        let objects = Arc::new(objects);
        let index = HeaderIndex::new(objects.clone());
        Self { objects, index }
    }

    /// The index cache owned by this store.
    pub fn index(&self) -> &HeaderIndex {
        &self.index
    }

    /// Discard the cached index and rebuild it by scanning every thread
    /// object. Returns the number of indexed threads.
    pub async fn rebuild_index(&self) -> SdkResult<usize> {
        Ok(self.index.rebuild().await?)
    }
}

#[async_trait]
impl ThreadStore for ObjectThreadStore {
    async fn list(&self) -> SdkResult<Vec<HeaderEntry>> {
        Ok(self.index.list().await?)
    }

    async fn get(&self, thread_id: &str) -> SdkResult<Option<ThreadRecord>> {
        Ok(self.objects.get(thread_id).await?)
    }

    async fn write(&self, record: ThreadRecord) -> SdkResult<ThreadRecord> {
        self.objects.put(&record).await?;
        if let Err(e) = self.index.record_write(&record).await {
            warn!(
                thread_id = %record.thread_id,
                error = %e,
                "thread object written but index update failed"
            );
            return Err(e.into());
        }
        Ok(record)
    }

    async fn delete(&self, thread_id: &str) -> SdkResult<()> {
        let existed = self.objects.delete(thread_id).await?;
        if let Err(e) = self.index.record_delete(thread_id).await {
            warn!(thread_id, error = %e, "thread object deleted but index update failed");
            return Err(e.into());
        }
        info!(thread_id, existed, "thread deleted");
        Ok(())
    }

    async fn reindex(&self) -> SdkResult<Option<usize>> {
        self.rebuild_index().await.map(Some)
    }

    fn backend_name(&self) -> &'static str {
        "object"
    }
}

impl std::fmt::Debug for ObjectThreadStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectThreadStore")
            .field("objects", &self.objects)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chatvault_store::{BlobError, BlobResult, InMemoryBlobStore};
    use chatvault_types::{MessageRecord, MessageRole};
    use std::sync::atomic::{AtomicBool, Ordering};

    const HEADER_KEY: &str = "threads/_head.json.gz";

    fn setup() -> (Arc<InMemoryBlobStore>, ObjectThreadStore) {
        let blobs = Arc::new(InMemoryBlobStore::new());
        let store = ObjectThreadStore::new(blobs.clone(), Some("threads/"));
        (blobs, store)
    }

    /// Rejects header uploads while armed; everything else passes through.
    struct HeaderRejecting {
        inner: InMemoryBlobStore,
        armed: AtomicBool,
    }

    #[async_trait]
    impl BlobStore for HeaderRejecting {
        async fn get(&self, key: &str) -> BlobResult<Option<Bytes>> {
            self.inner.get(key).await
        }

        async fn put(&self, key: &str, data: Bytes) -> BlobResult<()> {
            if key.ends_with("_head.json.gz") && self.armed.load(Ordering::SeqCst) {
                return Err(BlobError::Transport("header upload rejected".into()));
            }
            self.inner.put(key, data).await
        }

        async fn delete(&self, key: &str) -> BlobResult<bool> {
            self.inner.delete(key).await
        }

        async fn list(&self, prefix: &str) -> BlobResult<Vec<String>> {
            self.inner.list(prefix).await
        }
    }

    #[tokio::test]
    async fn trip_plan_scenario() {
        let (_, store) = setup();

        let first = ThreadRecord::new("abc123")
            .with_title("Trip plan")
            .with_message(MessageRecord::user("Where should we go?"));
        store.write(first.clone()).await.unwrap();

        assert_eq!(
            store.list().await.unwrap(),
            vec![HeaderEntry::new("abc123", Some("Trip plan".into()))]
        );
        assert_eq!(store.get("abc123").await.unwrap(), Some(first.clone()));

        let second = first
            .with_title("Updated")
            .with_message(MessageRecord::assistant("Lisbon, in spring."));
        store.write(second).await.unwrap();

        assert_eq!(
            store.list().await.unwrap(),
            vec![HeaderEntry::new("abc123", Some("Updated".into()))]
        );
        let got = store.get("abc123").await.unwrap().unwrap();
        assert_eq!(got.messages.len(), 2);
        assert_eq!(got.messages[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn write_returns_the_record() {
        let (_, store) = setup();
        let record = ThreadRecord::new("r1").with_title("t");
        assert_eq!(store.write(record.clone()).await.unwrap(), record);
    }

    #[tokio::test]
    async fn delete_removes_object_and_entry() {
        let (blobs, store) = setup();
        store.write(ThreadRecord::new("a1").with_title("A")).await.unwrap();
        store.write(ThreadRecord::new("b2").with_title("B")).await.unwrap();

        store.delete("a1").await.unwrap();
        assert_eq!(store.get("a1").await.unwrap(), None);
        assert_eq!(
            store.list().await.unwrap(),
            vec![HeaderEntry::new("b2", Some("B".into()))]
        );
        assert!(blobs.peek("threads/a1.json.gz").is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_, store) = setup();
        store.write(ThreadRecord::new("a1")).await.unwrap();
        store.delete("a1").await.unwrap();
        store.delete("a1").await.unwrap();
        store.delete("never9").await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_ids_are_rejected_without_io() {
        let (blobs, store) = setup();

        assert!(store.get("../etc").await.unwrap_err().is_invalid_identifier());
        assert!(store.delete("").await.unwrap_err().is_invalid_identifier());
        assert!(store
            .write(ThreadRecord::new("a b"))
            .await
            .unwrap_err()
            .is_invalid_identifier());
        assert!(store.get_or_new("x/y").await.unwrap_err().is_invalid_identifier());
        assert_eq!(blobs.request_count(), 0);
    }

    #[tokio::test]
    async fn get_or_new_falls_back_to_empty_record() {
        let (_, store) = setup();
        let fresh = store.get_or_new("n1").await.unwrap();
        assert_eq!(fresh, ThreadRecord::new("n1"));
        assert_eq!(store.get("n1").await.unwrap(), None);

        store.write(ThreadRecord::new("n1").with_title("Saved")).await.unwrap();
        assert_eq!(
            store.get_or_new("n1").await.unwrap().title.as_deref(),
            Some("Saved")
        );
    }

    #[tokio::test]
    async fn list_has_no_duplicates_and_latest_titles() {
        let (_, store) = setup();
        for (id, title) in [("a1", "one"), ("b2", "two"), ("a1", "three"), ("c3", "four")] {
            store.write(ThreadRecord::new(id).with_title(title)).await.unwrap();
        }
        assert_eq!(
            store.list().await.unwrap(),
            vec![
                HeaderEntry::new("c3", Some("four".into())),
                HeaderEntry::new("b2", Some("two".into())),
                HeaderEntry::new("a1", Some("three".into())),
            ]
        );
    }

    #[tokio::test]
    async fn rebuild_after_header_loss_matches_previous_listing() {
        let (blobs, store) = setup();
        for (id, title) in [("240101a", Some("New year")), ("240214b", None), ("231225c", Some("Gifts"))] {
            let mut record = ThreadRecord::new(id).with_message(MessageRecord::user("hi"));
            record.title = title.map(str::to_string);
            store.write(record).await.unwrap();
        }
        let before = store.list().await.unwrap();

        assert!(blobs.remove_raw(HEADER_KEY));
        let reopened = ObjectThreadStore::new(blobs.clone(), Some("threads/"));
        assert_eq!(reopened.list().await.unwrap(), before);
        assert!(blobs.peek(HEADER_KEY).is_some());
    }

    #[tokio::test]
    async fn second_instance_reads_persisted_header() {
        let (blobs, store) = setup();
        store.write(ThreadRecord::new("a1").with_title("A")).await.unwrap();

        let reopened = ObjectThreadStore::new(blobs.clone(), Some("threads/"));
        assert_eq!(reopened.list().await.unwrap(), store.list().await.unwrap());
    }

    #[tokio::test]
    async fn index_failure_keeps_object_and_reports_error() {
        let blobs = Arc::new(HeaderRejecting {
            inner: InMemoryBlobStore::new(),
            armed: AtomicBool::new(false),
        });
        let store = ObjectThreadStore::new(blobs.clone(), None);
        store.list().await.unwrap();

        blobs.armed.store(true, Ordering::SeqCst);
        let record = ThreadRecord::new("a1").with_title("Kept");
        let err = store.write(record.clone()).await.unwrap_err();
        assert!(err.is_unavailable(), "{err:?}");

        assert_eq!(store.get("a1").await.unwrap(), Some(record));
        assert!(store.list().await.unwrap().is_empty());

        blobs.armed.store(false, Ordering::SeqCst);
        assert_eq!(store.reindex().await.unwrap(), Some(1));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn direct_get_of_corrupt_object_is_an_error() {
        let (blobs, store) = setup();
        blobs.insert_raw("threads/bad1.json.gz", "garbage");
        assert!(store.get("bad1").await.unwrap_err().is_corrupt());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_share_one_store() {
        let blobs = Arc::new(InMemoryBlobStore::new());
        let store: Arc<dyn ThreadStore> = Arc::new(ObjectThreadStore::new(blobs.clone(), None));

        let mut tasks = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let record = ThreadRecord::new(format!("c{i:02}")).with_title(format!("Chat {i}"));
                store.write(record).await.map(|_| ())
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 20);
        assert_eq!(listed[0].thread_id, "c19");

        let reopened = ObjectThreadStore::new(blobs, None);
        assert_eq!(reopened.list().await.unwrap(), listed);
    }
}
