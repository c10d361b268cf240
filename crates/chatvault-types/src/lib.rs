//! Foundation types for chatvault.
//!
//! This crate provides the records persisted by the thread store and the
//! identifier rules every other chatvault crate relies on. Every other
//! chatvault crate depends on `chatvault-types`.
//!
//! # Key Types
//!
//! - [`ThreadRecord`] -- The full transcript of one conversation
//! - [`MessageRecord`] -- One turn in a transcript
//! - [`MessageRole`] -- Closed set of speakers (System, Assistant, User)
//! - [`InlineAttachment`] -- Inline data attached to a message (image URIs)
//! - [`HeaderEntry`] -- The `{thread_id, title}` projection used for listing
//!
//! # Identifiers
//!
//! Thread identifiers are restricted to ASCII letters and digits so that they
//! can be embedded verbatim in object keys and file names. See [`ids`].

pub mod error;
pub mod header;
pub mod ids;
pub mod thread;

pub use error::TypeError;
pub use header::HeaderEntry;
pub use ids::{is_valid_thread_id, mint_thread_id, validate_thread_id};
pub use thread::{InlineAttachment, InlineKind, MessageRecord, MessageRole, ThreadRecord};
