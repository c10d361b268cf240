use std::sync::Arc;

use chatvault_store::{DirBlobStore, ObjectKeys, ThreadObjects};
use tracing::{debug, info};

use crate::config::{Backend, StorageConfig};
use crate::error::SdkResult;
use crate::local::LocalThreadStore;
use crate::object::ObjectThreadStore;
use crate::store::ThreadStore;

/// Build the store selected by `config`.
///
/// No I/O happens here; the object backend loads its index on first use.
pub fn open_store(config: &StorageConfig) -> SdkResult<Arc<dyn ThreadStore>> {
    config.validate()?;
    match config.backend {
        Backend::Object => {
            let object = &config.object;
            if let Some(path) = &object.credential_path {
                debug!(path = %path.display(), "credential path not used by the directory transport");
            }
            let blobs = Arc::new(DirBlobStore::new(&object.bucket));
            let objects = ThreadObjects::new(blobs, ObjectKeys::new(object.prefix.as_deref()))
                .with_read_retry(object.read_retry())
                .with_write_retry(object.write_retry());
            info!(
                bucket = %object.bucket,
                prefix = object.prefix.as_deref().unwrap_or(""),
                "opened object thread store"
            );
            Ok(Arc::new(ObjectThreadStore::from_objects(objects)))
        }
        Backend::Local => {
            let directory = &config.local.memory_directory;
            info!(directory = %directory.display(), "opened local thread store");
            Ok(Arc::new(LocalThreadStore::new(directory.clone())))
        }
    }
}
