//! High-level thread store API for chatvault.
//!
//! Applications hold an `Arc<dyn ThreadStore>` and call `list`, `get`,
//! `write` and `delete` on it. Two backends implement the trait:
//!
//! - [`ObjectThreadStore`] keeps one compressed object per thread in a blob
//!   namespace and answers `list` from a [`HeaderIndex`] cache.
//! - [`LocalThreadStore`] keeps the same objects in a plain directory and
//!   answers `list` by reading every file.
//!
//! [`open_store`] builds the backend named by a [`StorageConfig`].

pub mod config;
pub mod error;
pub mod local;
pub mod object;
pub mod open;
pub mod store;

pub use config::{Backend, LocalConfig, ObjectConfig, StorageConfig};
pub use error::{SdkError, SdkResult};
pub use local::LocalThreadStore;
pub use object::ObjectThreadStore;
pub use open::open_store;
pub use store::ThreadStore;

// Re-export key types
pub use chatvault_index::HeaderIndex;
pub use chatvault_store::{BlobStore, DirBlobStore, InMemoryBlobStore, RetryPolicy};
pub use chatvault_types::{
    mint_thread_id, HeaderEntry, InlineAttachment, InlineKind, MessageRecord, MessageRole,
    ThreadRecord,
};
