use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use crate::blob::BlobStore;
use crate::error::{BlobError, BlobResult};

/// In-memory, `BTreeMap`-based blob namespace.
///
/// Intended for tests and embedding. Blobs are held behind a `RwLock` for
/// safe concurrent access. Two test hooks make transport behavior
/// observable: a request counter, and an injectable run of failures that
/// makes the next `n` calls return [`BlobError::Transport`].
pub struct InMemoryBlobStore {
    blobs: RwLock<BTreeMap<String, Bytes>>,
    requests: AtomicU64,
    failures_pending: AtomicU32,
}

impl InMemoryBlobStore {
    /// Create a new empty namespace.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(BTreeMap::new()),
            requests: AtomicU64::new(0),
            failures_pending: AtomicU32::new(0),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|map| map.len()).unwrap_or(0)
    }

    /// Returns `true` if the namespace is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted list of all keys, bypassing the request counter.
    pub fn keys(&self) -> Vec<String> {
        self.blobs
            .read()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Read a blob directly, bypassing the request counter and failure hook.
    pub fn peek(&self, key: &str) -> Option<Bytes> {
        self.blobs.read().ok()?.get(key).cloned()
    }

    /// Write a blob directly, bypassing the request counter and failure hook.
    ///
    /// Models an out-of-band writer (another process, an operator).
    pub fn insert_raw(&self, key: impl Into<String>, data: impl Into<Bytes>) {
        if let Ok(mut map) = self.blobs.write() {
            map.insert(key.into(), data.into());
        }
    }

    /// Remove a blob directly, bypassing the request counter and failure hook.
    pub fn remove_raw(&self, key: &str) -> bool {
        self.blobs
            .write()
            .map(|mut map| map.remove(key).is_some())
            .unwrap_or(false)
    }

    /// Total number of transport calls served (including failed ones).
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    /// Make the next `n` transport calls fail with a transport error.
    pub fn fail_next_requests(&self, n: u32) {
        self.failures_pending.store(n, Ordering::SeqCst);
    }

    fn begin_request(&self, op: &str, key: &str) -> BlobResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let injected = self
            .failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(BlobError::Transport(format!("injected failure on {op} {key}")));
        }
        Ok(())
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> BlobError {
    BlobError::Transport(format!("lock poisoned: {e}"))
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn get(&self, key: &str) -> BlobResult<Option<Bytes>> {
        self.begin_request("get", key)?;
        let map = self.blobs.read().map_err(poisoned)?;
        Ok(map.get(key).cloned())
    }

    async fn put(&self, key: &str, data: Bytes) -> BlobResult<()> {
        self.begin_request("put", key)?;
        let mut map = self.blobs.write().map_err(poisoned)?;
        map.insert(key.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> BlobResult<bool> {
        self.begin_request("delete", key)?;
        let mut map = self.blobs.write().map_err(poisoned)?;
        Ok(map.remove(key).is_some())
    }

    async fn list(&self, prefix: &str) -> BlobResult<Vec<String>> {
        self.begin_request("list", prefix)?;
        let map = self.blobs.read().map_err(poisoned)?;
        Ok(map
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .field("requests", &self.request_count())
            .finish()
    }
}
