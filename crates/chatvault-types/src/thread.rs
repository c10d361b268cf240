use std::fmt;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::TypeError;
use crate::header::HeaderEntry;

/// The full transcript of one conversation.
///
/// `thread_id` is the store key and never changes once a record exists. The
/// store only ever looks at `thread_id` and `title`; everything else is
/// opaque payload that must survive a write/read cycle unchanged.
///
/// Field names on the wire are PascalCase (`ThreadId`, `Title`, ...), which
/// keeps objects written by earlier deployments readable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ThreadRecord {
    /// The completion model last used in this thread.
    #[serde(default)]
    pub model: Option<String>,
    /// Short summary of the thread; absent until one is generated.
    #[serde(default)]
    pub title: Option<String>,
    /// Store key. ASCII letters and digits only.
    pub thread_id: String,
    /// Messages in chronological order.
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
}

impl ThreadRecord {
    /// Create an empty thread with the given id.
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            ..Self::default()
        }
    }

    /// Builder-style title setter.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder-style model setter.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Builder-style message append.
    pub fn with_message(mut self, message: MessageRecord) -> Self {
        self.messages.push(message);
        self
    }

    /// Number of messages in the transcript.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Project this record to its listing entry.
    pub fn header(&self) -> HeaderEntry {
        HeaderEntry::new(self.thread_id.clone(), self.title.clone())
    }
}

/// One turn in a transcript.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageRecord {
    /// Unique within the thread, e.g. `user-184467`.
    pub id: String,
    /// Change counter used by clients for re-rendering.
    #[serde(default)]
    pub version: u32,
    /// Completion latency, recorded on assistant messages.
    /// Omitted from the wire when absent; readers treat a missing value as 0.
    #[serde(rename = "ResponseTimeMills", default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u32>,
    #[serde(rename = "Type", default)]
    pub role: MessageRole,
    /// The model that produced this message.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(rename = "Message", default, deserialize_with = "null_as_empty")]
    pub text: String,
    #[serde(default)]
    pub inline_data: Vec<InlineAttachment>,
}

impl MessageRecord {
    /// Create a message with a role-prefixed random id and a random version.
    pub fn new(role: MessageRole, text: impl Into<String>) -> Self {
        let mut rng = rand::thread_rng();
        let suffix: u32 = rng.gen_range(0..=i32::MAX as u32);
        Self {
            id: format!("{}-{suffix}", role.as_str()),
            version: rng.gen_range(0..=i32::MAX as u32),
            response_time_ms: None,
            role,
            model: None,
            text: text.into(),
            inline_data: Vec::new(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(MessageRole::System, text)
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, text)
    }

    /// Builder-style id override.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_response_time_ms(mut self, ms: u32) -> Self {
        self.response_time_ms = Some(ms);
        self
    }

    pub fn with_attachment(mut self, attachment: InlineAttachment) -> Self {
        self.inline_data.push(attachment);
        self
    }
}

/// Who authored a message.
///
/// Encoded on the wire as an integer code (System=1, Assistant=2, User=4).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MessageRole {
    System,
    #[default]
    Assistant,
    User,
}

impl MessageRole {
    /// Lowercase name, used as the message id prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Assistant => "assistant",
            Self::User => "user",
        }
    }

    /// Integer code stored on the wire.
    pub fn code(&self) -> u8 {
        match self {
            Self::System => 1,
            Self::Assistant => 2,
            Self::User => 4,
        }
    }
}

impl TryFrom<u8> for MessageRole {
    type Error = TypeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::System),
            2 => Ok(Self::Assistant),
            4 => Ok(Self::User),
            other => Err(TypeError::UnknownRole(other)),
        }
    }
}

impl From<MessageRole> for u8 {
    fn from(role: MessageRole) -> Self {
        role.code()
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inline data attached to a message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InlineAttachment {
    #[serde(rename = "Type")]
    pub kind: InlineKind,
    pub uri: String,
}

impl InlineAttachment {
    /// An image reference by URI.
    pub fn image(uri: impl Into<String>) -> Self {
        Self {
            kind: InlineKind::Image,
            uri: uri.into(),
        }
    }
}

/// Kind of inline data. Encoded as an integer code (Image=1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum InlineKind {
    Image,
}

impl TryFrom<u8> for InlineKind {
    type Error = TypeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Image),
            other => Err(TypeError::UnknownInlineKind(other)),
        }
    }
}

impl From<InlineKind> for u8 {
    fn from(kind: InlineKind) -> Self {
        match kind {
            InlineKind::Image => 1,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
