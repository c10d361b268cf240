//! Object key derivation.
//!
//! Layout of a namespace:
//!
//! ```text
//! {prefix}{thread_id}.json.gz   one object per thread
//! {prefix}_head.json.gz         the header (index) object
//! ```
//!
//! Thread ids are ASCII-alphanumeric, so no thread key can collide with the
//! header key, and anything else found under the prefix is foreign.

use chatvault_types::{is_valid_thread_id, validate_thread_id, TypeError};

/// Suffix shared by thread objects and the header object.
pub const OBJECT_EXTENSION: &str = ".json.gz";

/// Base name of the header object.
pub const HEADER_NAME: &str = "_head";

/// What a listed key refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyKind {
    /// A thread object, carrying the thread id.
    Thread(String),
    /// The header object.
    Header,
    /// Anything else under the prefix (temp files, unrelated uploads).
    Foreign,
}

/// Derives object keys under an optional prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectKeys {
    prefix: String,
}

impl ObjectKeys {
    /// Keys under `prefix` (`None` or `""` for the namespace root).
    ///
    /// The prefix is used verbatim; include a trailing `/` to place objects
    /// in a pseudo-directory.
    pub fn new(prefix: Option<&str>) -> Self {
        Self {
            prefix: prefix.unwrap_or_default().to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key of the object holding `thread_id`.
    pub fn thread_key(&self, thread_id: &str) -> Result<String, TypeError> {
        validate_thread_id(thread_id)?;
        Ok(format!("{}{thread_id}{OBJECT_EXTENSION}", self.prefix))
    }

    /// Key of the header object.
    pub fn header_key(&self) -> String {
        format!("{}{HEADER_NAME}{OBJECT_EXTENSION}", self.prefix)
    }

    /// Classify a key returned by a namespace listing.
    pub fn classify(&self, key: &str) -> KeyKind {
        let Some(name) = key
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_suffix(OBJECT_EXTENSION))
        else {
            return KeyKind::Foreign;
        };
        if name == HEADER_NAME {
            KeyKind::Header
        } else if is_valid_thread_id(name) {
            KeyKind::Thread(name.to_string())
        } else {
            KeyKind::Foreign
        }
    }
}
