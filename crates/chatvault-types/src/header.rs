//! Listing projection of a thread.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The `{thread_id, title}` projection of a [`ThreadRecord`] kept in the
/// header index.
///
/// Always regenerated from the authoritative record, never edited directly.
///
/// [`ThreadRecord`]: crate::ThreadRecord
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HeaderEntry {
    pub thread_id: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl HeaderEntry {
    pub fn new(thread_id: impl Into<String>, title: Option<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            title,
        }
    }
}

impl fmt::Display for HeaderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.title {
            Some(title) => write!(f, "{} {}", self.thread_id, title),
            None => write!(f, "{}", self.thread_id),
        }
    }
}
