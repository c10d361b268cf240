//! Filesystem-backed blob namespace.
//!
//! [`DirBlobStore`] maps object keys onto paths below a root directory, with
//! `/` in a key becoming a directory separator. It stands in for a remote
//! bucket when running against local disk, and keeps the exact key layout a
//! bucket would hold, header object included.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use rand::Rng;
use tracing::debug;

use crate::blob::BlobStore;
use crate::error::{BlobError, BlobResult};

/// A blob namespace rooted at a local directory.
#[derive(Clone, Debug)]
pub struct DirBlobStore {
    root: PathBuf,
}

impl DirBlobStore {
    /// Use `root` as the namespace. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory backing this namespace.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to a path below the root.
    ///
    /// Rejects keys that could escape the root or that do not name a file.
    fn path_for(&self, key: &str) -> BlobResult<PathBuf> {
        let bad = key.is_empty()
            || key.starts_with('/')
            || key.ends_with('/')
            || key.contains('\\')
            || key.contains('\0')
            || key.split('/').any(|part| part.is_empty() || part == "." || part == "..");
        if bad {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }

    /// Recursively collect keys below `dir`, relative to the root.
    async fn collect_keys(&self, dir: PathBuf, out: &mut Vec<String>) -> BlobResult<()> {
        let mut pending = vec![dir];
        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                    continue;
                }
                let Ok(relative) = path.strip_prefix(&self.root) else {
                    continue;
                };
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                out.push(key);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for DirBlobStore {
    async fn get(&self, key: &str) -> BlobResult<Option<Bytes>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, data: Bytes) -> BlobResult<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write beside the target, then rename over it, so readers never see
        // a half-written object.
        let suffix: u32 = rand::thread_rng().gen();
        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(format!(".tmp{suffix:08x}"));
        let tmp = path.with_file_name(tmp_name);

        tokio::fs::write(&tmp, &data).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!(key, len = data.len(), "blob written");
        Ok(())
    }

    async fn delete(&self, key: &str) -> BlobResult<bool> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, prefix: &str) -> BlobResult<Vec<String>> {
        let mut keys = Vec::new();
        self.collect_keys(self.root.clone(), &mut keys).await?;
        keys.retain(|k| k.starts_with(prefix));
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trip_nested_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirBlobStore::new(dir.path());

        store
            .put("threads/abc.json.gz", Bytes::from_static(b"data"))
            .await
            .unwrap();
        let got = store.get("threads/abc.json.gz").await.unwrap().unwrap();
        assert_eq!(&got[..], b"data");
        assert!(dir.path().join("threads").join("abc.json.gz").exists());
    }

    #[tokio::test]
    async fn missing_root_behaves_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirBlobStore::new(dir.path().join("not-yet"));

        assert!(store.get("a").await.unwrap().is_none());
        assert!(!store.delete("a").await.unwrap());
        assert!(store.list("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_is_recursive_sorted_and_prefix_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirBlobStore::new(dir.path());
        for key in ["p/b.json.gz", "p/a.json.gz", "p/_head.json.gz", "other.txt"] {
            store.put(key, Bytes::from_static(b"x")).await.unwrap();
        }

        assert_eq!(
            store.list("p/").await.unwrap(),
            vec!["p/_head.json.gz", "p/a.json.gz", "p/b.json.gz"]
        );
        assert_eq!(store.list("").await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn overwrite_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirBlobStore::new(dir.path());
        store.put("k", Bytes::from_static(b"1")).await.unwrap();
        store.put("k", Bytes::from_static(b"2")).await.unwrap();

        assert_eq!(store.list("").await.unwrap(), vec!["k"]);
        assert_eq!(&store.get("k").await.unwrap().unwrap()[..], b"2");
    }

    #[tokio::test]
    async fn rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirBlobStore::new(dir.path());
        for key in ["", "../x", "a/../b", "/abs", "a//b", "dir/", "a\\b"] {
            assert!(
                matches!(store.get(key).await, Err(BlobError::InvalidKey(_))),
                "{key:?} should be rejected"
            );
        }
    }
}
