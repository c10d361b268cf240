//! Typed access to thread objects and the header object.

use std::sync::Arc;

use bytes::Bytes;
use chatvault_types::{HeaderEntry, ThreadRecord};
use tracing::debug;

use crate::blob::BlobStore;
use crate::codec;
use crate::error::{StoreError, StoreResult};
use crate::keys::{KeyKind, ObjectKeys};
use crate::retry::RetryPolicy;

/// Maps thread ids to compressed objects in a blob namespace.
///
/// Reads (`get`, `thread_ids`, `load_header`) go through the read policy;
/// writes and deletes go through the write policy, which makes a single
/// attempt unless configured otherwise.
pub struct ThreadObjects {
    blobs: Arc<dyn BlobStore>,
    keys: ObjectKeys,
    read_retry: RetryPolicy,
    write_retry: RetryPolicy,
}

impl ThreadObjects {
    pub fn new(blobs: Arc<dyn BlobStore>, keys: ObjectKeys) -> Self {
        Self {
            blobs,
            keys,
            read_retry: RetryPolicy::default(),
            write_retry: RetryPolicy::single(),
        }
    }

    pub fn with_read_retry(mut self, policy: RetryPolicy) -> Self {
        self.read_retry = policy;
        self
    }

    pub fn with_write_retry(mut self, policy: RetryPolicy) -> Self {
        self.write_retry = policy;
        self
    }

    pub fn keys(&self) -> &ObjectKeys {
        &self.keys
    }

    /// Fetch and decode the thread stored under `thread_id`.
    ///
    /// Returns `Ok(None)` when no object exists. An object whose contents do
    /// not decode, or decode to a different thread id, is `CorruptRecord`.
    pub async fn get(&self, thread_id: &str) -> StoreResult<Option<ThreadRecord>> {
        let key = self.keys.thread_key(thread_id)?;
        let Some(bytes) = self.fetch(&key).await? else {
            debug!(thread_id, "thread object not found");
            return Ok(None);
        };

        let record: ThreadRecord = codec::decode(&bytes).map_err(|e| StoreError::CorruptRecord {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        if record.thread_id != thread_id {
            return Err(StoreError::CorruptRecord {
                key,
                reason: format!("object holds thread {:?}", record.thread_id),
            });
        }

        debug!(thread_id, messages = record.messages.len(), "thread object read");
        Ok(Some(record))
    }

    /// Encode and upload `record`, overwriting any previous object.
    pub async fn put(&self, record: &ThreadRecord) -> StoreResult<()> {
        let key = self.keys.thread_key(&record.thread_id)?;
        let data = codec::encode(record).map_err(|source| StoreError::Encode {
            key: key.clone(),
            source,
        })?;
        let len = data.len();
        self.upload(&key, Bytes::from(data)).await?;
        debug!(thread_id = %record.thread_id, len, "thread object written");
        Ok(())
    }

    /// Remove the object for `thread_id`. Returns `true` if it existed.
    ///
    /// Deleting a missing object is not an error.
    pub async fn delete(&self, thread_id: &str) -> StoreResult<bool> {
        let key = self.keys.thread_key(thread_id)?;
        let blobs = self.blobs.as_ref();
        let key_ref = key.as_str();
        let existed = self
            .write_retry
            .run(key_ref, move || blobs.delete(key_ref))
            .await?;
        debug!(thread_id, existed, "thread object deleted");
        Ok(existed)
    }

    /// Ids of every thread object in the namespace, ascending.
    ///
    /// The header object and keys that do not name a valid thread are
    /// skipped.
    pub async fn thread_ids(&self) -> StoreResult<Vec<String>> {
        let blobs = self.blobs.as_ref();
        let prefix = self.keys.prefix();
        let keys = self
            .read_retry
            .run(prefix, move || blobs.list(prefix))
            .await?;

        let mut ids = Vec::with_capacity(keys.len());
        for key in keys {
            match self.keys.classify(&key) {
                KeyKind::Thread(id) => ids.push(id),
                KeyKind::Header => {}
                KeyKind::Foreign => debug!(key, "ignoring foreign object"),
            }
        }
        Ok(ids)
    }

    /// Fetch and decode the header object.
    ///
    /// Returns `Ok(None)` when it does not exist and `CorruptRecord` when it
    /// cannot be decoded.
    pub async fn load_header(&self) -> StoreResult<Option<Vec<HeaderEntry>>> {
        let key = self.keys.header_key();
        let Some(bytes) = self.fetch(&key).await? else {
            return Ok(None);
        };
        let entries = codec::decode(&bytes).map_err(|e| StoreError::CorruptRecord {
            key,
            reason: e.to_string(),
        })?;
        Ok(Some(entries))
    }

    /// Encode `entries` as one JSON array and upload it as the header object.
    pub async fn store_header(&self, entries: &[HeaderEntry]) -> StoreResult<()> {
        let key = self.keys.header_key();
        let data = codec::encode(entries).map_err(|source| StoreError::Encode {
            key: key.clone(),
            source,
        })?;
        self.upload(&key, Bytes::from(data)).await?;
        debug!(entries = entries.len(), "header object written");
        Ok(())
    }

    async fn fetch(&self, key: &str) -> StoreResult<Option<Bytes>> {
        let blobs = self.blobs.as_ref();
        self.read_retry.run(key, move || blobs.get(key)).await
    }

    async fn upload(&self, key: &str, data: Bytes) -> StoreResult<()> {
        let blobs = self.blobs.as_ref();
        self.write_retry
            .run(key, move || blobs.put(key, data.clone()))
            .await
    }
}

impl std::fmt::Debug for ThreadObjects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadObjects")
            .field("keys", &self.keys)
            .field("read_retry", &self.read_retry)
            .field("write_retry", &self.write_retry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBlobStore;
    use chatvault_types::MessageRecord;

    fn setup(prefix: Option<&str>) -> (Arc<InMemoryBlobStore>, ThreadObjects) {
        let blobs = Arc::new(InMemoryBlobStore::new());
        let objects = ThreadObjects::new(blobs.clone(), ObjectKeys::new(prefix));
        (blobs, objects)
    }

    fn trip_plan() -> ThreadRecord {
        let mut message = MessageRecord::user("Where to go?").with_id("user-1");
        message.version = 1;
        ThreadRecord::new("abc123")
            .with_title("Trip plan")
            .with_message(message)
    }

    #[test]
    fn trip_plan_fixture_is_stable() {
        assert_eq!(trip_plan(), trip_plan());
    }

    #[tokio::test]
    async fn put_then_get() {
        let (blobs, objects) = setup(Some("chat/"));
        objects.put(&trip_plan()).await.unwrap();

        assert_eq!(blobs.keys(), vec!["chat/abc123.json.gz"]);
        assert_eq!(objects.get("abc123").await.unwrap(), Some(trip_plan()));
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let (_, objects) = setup(None);
        assert_eq!(objects.get("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn invalid_ids_do_no_io() {
        let (blobs, objects) = setup(None);
        let mut bad = trip_plan();
        bad.thread_id = "../escape".into();

        assert!(matches!(objects.get("a/b").await, Err(StoreError::InvalidIdentifier(_))));
        assert!(matches!(objects.put(&bad).await, Err(StoreError::InvalidIdentifier(_))));
        assert!(matches!(objects.delete("").await, Err(StoreError::InvalidIdentifier(_))));
        assert_eq!(blobs.request_count(), 0);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_, objects) = setup(None);
        objects.put(&trip_plan()).await.unwrap();

        assert!(objects.delete("abc123").await.unwrap());
        assert!(!objects.delete("abc123").await.unwrap());
        assert_eq!(objects.get("abc123").await.unwrap(), None);
    }

    #[tokio::test]
    async fn undecodable_object_is_corrupt() {
        let (blobs, objects) = setup(None);
        blobs.insert_raw("abc123.json.gz", "not gzip");

        let err = objects.get("abc123").await.unwrap_err();
        assert!(err.is_corrupt(), "{err:?}");
    }

    #[tokio::test]
    async fn mismatched_thread_id_is_corrupt() {
        let (blobs, objects) = setup(None);
        let other = codec::encode(&ThreadRecord::new("zzz999")).unwrap();
        blobs.insert_raw("abc123.json.gz", other);

        assert!(objects.get("abc123").await.unwrap_err().is_corrupt());
    }

    #[tokio::test]
    async fn reads_retry_transient_failures() {
        let (blobs, objects) = setup(None);
        objects.put(&trip_plan()).await.unwrap();

        blobs.fail_next_requests(2);
        assert_eq!(objects.get("abc123").await.unwrap(), Some(trip_plan()));
    }

    #[tokio::test]
    async fn reads_give_up_after_three_attempts() {
        let (blobs, objects) = setup(None);
        blobs.fail_next_requests(3);
        let before = blobs.request_count();

        let err = objects.get("abc123").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { attempts: 3, .. }), "{err:?}");
        assert_eq!(blobs.request_count() - before, 3);
    }

    #[tokio::test]
    async fn writes_make_one_attempt_by_default() {
        let (blobs, objects) = setup(None);
        blobs.fail_next_requests(1);

        let err = objects.put(&trip_plan()).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { attempts: 1, .. }));
        assert!(blobs.is_empty());
    }

    #[tokio::test]
    async fn write_policy_is_configurable() {
        let (blobs, objects) = setup(None);
        let objects = objects.with_write_retry(RetryPolicy::new(2));
        blobs.fail_next_requests(1);

        objects.put(&trip_plan()).await.unwrap();
        assert_eq!(blobs.len(), 1);
    }

    #[tokio::test]
    async fn thread_ids_skip_header_and_foreign_keys() {
        let (blobs, objects) = setup(Some("chat/"));
        objects.put(&trip_plan()).await.unwrap();
        objects.put(&ThreadRecord::new("def456")).await.unwrap();
        objects.store_header(&[trip_plan().header()]).await.unwrap();
        blobs.insert_raw("chat/notes.txt", "x");
        blobs.insert_raw("chat/bad-name.json.gz", "x");
        blobs.insert_raw("elsewhere/ghi789.json.gz", "x");

        assert_eq!(objects.thread_ids().await.unwrap(), vec!["abc123", "def456"]);
    }

    #[tokio::test]
    async fn header_round_trip() {
        let (_, objects) = setup(None);
        assert_eq!(objects.load_header().await.unwrap(), None);

        let entries = vec![trip_plan().header(), HeaderEntry::new("def456", None)];
        objects.store_header(&entries).await.unwrap();
        assert_eq!(objects.load_header().await.unwrap(), Some(entries));
    }

    #[tokio::test]
    async fn corrupt_header_is_reported() {
        let (blobs, objects) = setup(None);
        blobs.insert_raw("_head.json.gz", "garbage");
        assert!(objects.load_header().await.unwrap_err().is_corrupt());
    }
}
