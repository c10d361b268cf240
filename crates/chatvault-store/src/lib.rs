//! Blob-backed thread object storage for chatvault.
//!
//! This crate maps each chat thread to one gzip-compressed JSON object in a
//! flat, remotely hosted namespace, and owns the single header object that
//! the index cache persists next to them.
//!
//! # Layers
//!
//! - [`BlobStore`] -- the transport capability: get/put/delete/list on named
//!   byte blobs. Every call may fail transiently.
//! - [`codec`] -- JSON (non-ASCII emitted literally) wrapped in gzip
//! - [`ObjectKeys`] -- `{prefix}{thread_id}.json.gz` / `{prefix}_head.json.gz`
//! - [`RetryPolicy`] -- fixed attempt bound around transport calls
//! - [`ThreadObjects`] -- typed get/put/delete of thread records and the
//!   header object on top of the layers above
//!
//! # Storage Backends
//!
//! - [`InMemoryBlobStore`] -- `BTreeMap`-based namespace for tests and embedding
//! - [`DirBlobStore`] -- a directory on the local filesystem addressed by key
//!
//! # Design Rules
//!
//! 1. Thread ids are validated before any I/O is attempted.
//! 2. A missing object is a value (`None`), never an error.
//! 3. Undecodable bytes surface as `CorruptRecord`, never as a panic.
//! 4. Writes overwrite unconditionally: the last successful writer wins.
//! 5. Transport failures are retried up to the policy bound, then reported as
//!    `Unavailable` with the last underlying error.

pub mod blob;
pub mod codec;
pub mod dir;
pub mod error;
pub mod keys;
pub mod memory;
pub mod objects;
pub mod retry;

// Re-export primary types at crate root for ergonomic imports.
pub use blob::BlobStore;
pub use dir::DirBlobStore;
pub use error::{BlobError, BlobResult, CodecError, StoreError, StoreResult};
pub use keys::{KeyKind, ObjectKeys, HEADER_NAME, OBJECT_EXTENSION};
pub use memory::InMemoryBlobStore;
pub use objects::ThreadObjects;
pub use retry::RetryPolicy;
