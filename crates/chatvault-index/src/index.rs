//! The [`HeaderIndex`] cache.
//!
//! One `tokio::sync::Mutex` guards the whole cache, including the lazy first
//! load, and stays held across the header upload of every mutation. Only one
//! load or mutation runs at a time, and readers see the map either before or
//! after an update. The map is replaced only after the header object has
//! been written.

use std::collections::BTreeMap;
use std::sync::Arc;

use chatvault_store::{StoreError, ThreadObjects};
use chatvault_types::{HeaderEntry, ThreadRecord};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::IndexResult;

type HeaderMap = BTreeMap<String, HeaderEntry>;

/// In-memory `thread_id -> HeaderEntry` map backed by the header object.
pub struct HeaderIndex {
    objects: Arc<ThreadObjects>,
    /// `None` until the first successful load or rebuild.
    state: Mutex<Option<HeaderMap>>,
}

impl HeaderIndex {
    /// Create an index over `objects`. Nothing is read until first use.
    pub fn new(objects: Arc<ThreadObjects>) -> Self {
        Self {
            objects,
            state: Mutex::new(None),
        }
    }

    /// Returns `true` once the index has been loaded or rebuilt.
    pub async fn is_ready(&self) -> bool {
        self.state.lock().await.is_some()
    }

    /// Number of entries, loading the index if necessary.
    pub async fn len(&self) -> IndexResult<usize> {
        let mut state = self.state.lock().await;
        Ok(self.ready(&mut state).await?.len())
    }

    /// Returns `true` if the index holds no entries.
    pub async fn is_empty(&self) -> IndexResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Snapshot of all entries, ordered by `thread_id` descending.
    ///
    /// The first call on a fresh index loads (or rebuilds) it.
    pub async fn list(&self) -> IndexResult<Vec<HeaderEntry>> {
        let mut state = self.state.lock().await;
        let map = self.ready(&mut state).await?;
        Ok(map.values().rev().cloned().collect())
    }

    /// Cached entry for `thread_id`, loading the index if necessary.
    pub async fn get(&self, thread_id: &str) -> IndexResult<Option<HeaderEntry>> {
        let mut state = self.state.lock().await;
        Ok(self.ready(&mut state).await?.get(thread_id).cloned())
    }

    /// Reflect a thread object that has just been written.
    ///
    /// When the cached title already matches, nothing is uploaded. Otherwise
    /// the entry is replaced and the whole index is persisted. Returns `true`
    /// if the header object was rewritten.
    pub async fn record_write(&self, record: &ThreadRecord) -> IndexResult<bool> {
        let mut state = self.state.lock().await;
        let map = self.ready(&mut state).await?;

        let unchanged = map
            .get(&record.thread_id)
            .is_some_and(|entry| entry.title == record.title);
        if unchanged {
            debug!(thread_id = %record.thread_id, "title unchanged; header not rewritten");
            return Ok(false);
        }

        let mut next = map.clone();
        next.insert(record.thread_id.clone(), record.header());
        self.persist(&next).await?;
        *map = next;
        Ok(true)
    }

    /// Reflect a thread object that has just been deleted.
    ///
    /// The header object is rewritten even when no entry existed.
    pub async fn record_delete(&self, thread_id: &str) -> IndexResult<()> {
        let mut state = self.state.lock().await;
        let map = self.ready(&mut state).await?;

        let mut next = map.clone();
        next.remove(thread_id);
        self.persist(&next).await?;
        *map = next;
        Ok(())
    }

    /// Discard the cached map and rebuild it from the thread objects,
    /// regardless of the header object's state. Returns the entry count.
    pub async fn rebuild(&self) -> IndexResult<usize> {
        let mut state = self.state.lock().await;
        let map = self.rebuild_map().await?;
        let count = map.len();
        *state = Some(map);
        Ok(count)
    }

    /// Borrow the loaded map, performing load-or-rebuild on first use.
    ///
    /// On failure the slot stays empty so a later call retries.
    async fn ready<'a>(&self, slot: &'a mut Option<HeaderMap>) -> IndexResult<&'a mut HeaderMap> {
        let map = match slot.take() {
            Some(map) => map,
            None => self.load_or_rebuild().await?,
        };
        Ok(slot.insert(map))
    }

    async fn load_or_rebuild(&self) -> IndexResult<HeaderMap> {
        match self.objects.load_header().await {
            Ok(Some(entries)) => {
                let map: HeaderMap = entries
                    .into_iter()
                    .map(|entry| (entry.thread_id.clone(), entry))
                    .collect();
                debug!(entries = map.len(), "header object loaded");
                Ok(map)
            }
            Ok(None) => {
                info!("header object missing; rebuilding index");
                self.rebuild_map().await
            }
            Err(e @ StoreError::CorruptRecord { .. }) => {
                warn!(error = %e, "header object unreadable; rebuilding index");
                self.rebuild_map().await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Scan every thread object, project it, and persist the result.
    ///
    /// Objects that fail to decode, or vanish between listing and fetching,
    /// are left out of the index.
    async fn rebuild_map(&self) -> IndexResult<HeaderMap> {
        let ids = self.objects.thread_ids().await?;
        info!(objects = ids.len(), "scanning thread objects");

        let mut map = HeaderMap::new();
        let mut skipped = 0usize;
        for id in ids {
            match self.objects.get(&id).await {
                Ok(Some(record)) => {
                    map.insert(record.thread_id.clone(), record.header());
                }
                Ok(None) => {
                    debug!(thread_id = %id, "thread object vanished during rebuild");
                }
                Err(e @ StoreError::CorruptRecord { .. }) => {
                    warn!(thread_id = %id, error = %e, "skipping corrupt thread object");
                    skipped += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.persist(&map).await?;
        info!(entries = map.len(), skipped, "index rebuilt");
        Ok(map)
    }

    async fn persist(&self, map: &HeaderMap) -> IndexResult<()> {
        let entries: Vec<HeaderEntry> = map.values().cloned().collect();
        self.objects.store_header(&entries).await?;
        Ok(())
    }
}

impl std::fmt::Debug for HeaderIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self
            .state
            .try_lock()
            .ok()
            .and_then(|state| state.as_ref().map(|map| map.len()));
        f.debug_struct("HeaderIndex")
            .field("objects", &self.objects)
            .field("entries", &entries)
            .finish()
    }
}
