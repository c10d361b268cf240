//! Local directory backend.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chatvault_store::{DirBlobStore, ObjectKeys, RetryPolicy, StoreError, ThreadObjects};
use chatvault_types::{HeaderEntry, ThreadRecord};
use tracing::{debug, warn};

use crate::error::SdkResult;
use crate::store::ThreadStore;

/// Threads stored as `{thread_id}.json.gz` files in one directory.
///
/// There is no header object: `list` reads and decodes every file, and
/// files that fail to decode are skipped. A missing directory lists as
/// empty and is created on the first write.
pub struct LocalThreadStore {
    directory: PathBuf,
    objects: ThreadObjects,
}

impl LocalThreadStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        let blobs = Arc::new(DirBlobStore::new(directory.clone()));
        let objects = ThreadObjects::new(blobs, ObjectKeys::new(None))
            .with_read_retry(RetryPolicy::single())
            .with_write_retry(RetryPolicy::single());
        Self { directory, objects }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[async_trait]
impl ThreadStore for LocalThreadStore {
    async fn list(&self) -> SdkResult<Vec<HeaderEntry>> {
        let ids = self.objects.thread_ids().await?;
        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            match self.objects.get(&id).await {
                Ok(Some(record)) => entries.push(record.header()),
                Ok(None) => debug!(thread_id = %id, "thread file vanished while listing"),
                Err(e @ StoreError::CorruptRecord { .. }) => {
                    warn!(thread_id = %id, error = %e, "skipping unreadable thread file");
                }
                Err(e) => return Err(e.into()),
            }
        }
        entries.sort_by(|a, b| b.thread_id.cmp(&a.thread_id));
        Ok(entries)
    }

    async fn get(&self, thread_id: &str) -> SdkResult<Option<ThreadRecord>> {
        Ok(self.objects.get(thread_id).await?)
    }

    async fn write(&self, record: ThreadRecord) -> SdkResult<ThreadRecord> {
        self.objects.put(&record).await?;
        Ok(record)
    }

    async fn delete(&self, thread_id: &str) -> SdkResult<()> {
        self.objects.delete(thread_id).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

impl std::fmt::Debug for LocalThreadStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalThreadStore")
            .field("directory", &self.directory)
            .finish()
    }
}
