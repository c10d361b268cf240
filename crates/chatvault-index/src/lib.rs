//! Header index cache for chatvault.
//!
//! Listing every thread by scanning the namespace would mean downloading and
//! decoding every object. Instead, a single header object holds the
//! `{thread_id, title}` projection of every thread, and [`HeaderIndex`]
//! keeps that projection in memory for the lifetime of a store instance.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --(first access)--> Loading --> Ready <--(write/delete)--+
//!                                                 |                      |
//!                                                 +----------------------+
//! ```
//!
//! Loading reads the header object. When it is missing or cannot be decoded
//! the index is rebuilt by scanning every thread object, and the result is
//! written back as the new header object.
//!
//! # Key Types
//!
//! - [`HeaderIndex`] -- the cache and its write-through update rules
//! - [`IndexError`] -- errors surfaced to the store facade

pub mod error;
pub mod index;

pub use error::{IndexError, IndexResult};
pub use index::HeaderIndex;
