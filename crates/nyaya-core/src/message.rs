//! Chat messages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sequential message identifier, unique within one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl MessageId {
    /// The id after this one
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Originator {
    /// The person using the chat
    User,
    /// The legal assistant backend
    Assistant,
}

impl Originator {
    /// True for messages typed by the user
    pub fn is_user(self) -> bool {
        matches!(self, Originator::User)
    }
}

/// A single chat message.
///
/// Messages are immutable once created; only the owning session builds them.
/// They serialize for display but cannot be read back in:
///
/// ```compile_fail
/// let msg: nyaya_core::ChatMessage =
///     serde_json::from_str(r#"{"id":1,"text":"hi","originator":"user","sent_at":"2024-01-01T00:00:00Z"}"#).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    id: MessageId,
    text: String,
    originator: Originator,
    sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub(crate) fn new(
        id: MessageId,
        text: impl Into<String>,
        originator: Originator,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            originator,
            sent_at,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn originator(&self) -> Originator {
        self.originator
    }

    pub fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }

    pub fn is_user(&self) -> bool {
        self.originator.is_user()
    }
}
