//! Chat sessions
//!
//! A [`ChatSession`] owns one conversation: an append-only list of
//! [`ChatMessage`]s plus a pending-reply flag. Sending is split in two
//! phases ([`ChatSession::begin_send`] / [`ChatSession::finish_send`]) so
//! a shared owner can drop its lock while the reply source is awaited;
//! [`ChatSession::send`] runs both phases back to back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::formatter::format_reply;
use crate::message::{ChatMessage, MessageId, Originator};
use crate::source::ReplySource;
use crate::Result;

/// Greeting seeded into new chat windows
pub const DEFAULT_GREETING: &str = "Hello! I'm your Legal Assistant. I can help you with legal questions, document guidance, and general legal information. How can I assist you today?";

/// Unique session identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(format!("session:{}", Uuid::new_v4()))
    }

    pub fn from_str(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A send that has appended its user message and awaits a reply
#[derive(Debug)]
#[must_use = "a pending send must be finished to clear the pending flag"]
pub struct PendingSend {
    user_message: MessageId,
    query: String,
}

impl PendingSend {
    /// Text to forward to the reply source
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Id of the user message this send appended
    pub fn user_message(&self) -> MessageId {
        self.user_message
    }
}

/// Result of one send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input, nothing appended
    Ignored,

    /// The reply was formatted and appended
    Replied {
        user_message: MessageId,
        reply: ChatMessage,
    },

    /// The reply source failed; only the user message was appended
    Failed {
        user_message: MessageId,
        error: String,
    },
}

impl SendOutcome {
    /// Text to show for this outcome, if any
    pub fn display_text(&self) -> Option<&str> {
        match self {
            SendOutcome::Ignored => None,
            SendOutcome::Replied { reply, .. } => Some(reply.text()),
            SendOutcome::Failed { error, .. } => Some(error),
        }
    }
}

/// One chat conversation
#[derive(Debug, Clone)]
pub struct ChatSession {
    /// Session ID
    pub id: SessionId,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    last_activity: DateTime<Utc>,

    messages: Vec<ChatMessage>,

    next_id: MessageId,

    /// Sends awaiting a reply
    in_flight: usize,
}

impl ChatSession {
    /// Create an empty session
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            created_at: now,
            last_activity: now,
            messages: Vec::new(),
            next_id: MessageId(1),
            in_flight: 0,
        }
    }

    /// Create a session opening with an assistant greeting
    pub fn greeted(greeting: impl Into<String>) -> Self {
        let mut session = Self::new();
        session.push(greeting.into(), Originator::Assistant);
        session
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// True while at least one send awaits its reply
    pub fn is_pending(&self) -> bool {
        self.in_flight > 0
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Update last activity
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// Check if the session has been idle longer than `timeout_secs`.
    /// A session waiting on a reply never expires.
    pub fn is_expired(&self, timeout_secs: u64) -> bool {
        if self.is_pending() {
            return false;
        }
        let elapsed = (Utc::now() - self.last_activity).num_seconds().max(0) as u64;
        elapsed > timeout_secs
    }

    /// Append the user's message and mark a reply as pending.
    ///
    /// Returns `None` for empty or whitespace-only text.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingSend> {
        if text.trim().is_empty() {
            return None;
        }

        let user_message = self.push(text.to_string(), Originator::User).id();
        self.in_flight += 1;

        Some(PendingSend {
            user_message,
            query: text.to_string(),
        })
    }

    /// Complete a send with the reply source's result.
    ///
    /// The pending flag is released whatever the result.
    pub fn finish_send(&mut self, pending: PendingSend, reply: Result<String>) -> SendOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);

        match reply {
            Ok(raw) => {
                let reply = self
                    .push(format_reply(&raw), Originator::Assistant)
                    .clone();
                SendOutcome::Replied {
                    user_message: pending.user_message,
                    reply,
                }
            }
            Err(e) => {
                tracing::error!("Chatbot error in {}: {}", self.id, e);
                self.touch();
                SendOutcome::Failed {
                    user_message: pending.user_message,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Send a message and wait for the reply
    pub async fn send(&mut self, text: &str, source: &dyn ReplySource) -> SendOutcome {
        let Some(pending) = self.begin_send(text) else {
            return SendOutcome::Ignored;
        };

        let reply = source.fetch_reply(pending.query()).await;
        self.finish_send(pending, reply)
    }

    /// Get session snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            created_at: self.created_at,
            last_activity: self.last_activity,
            pending: self.is_pending(),
            messages: self.messages.clone(),
        }
    }

    fn push(&mut self, text: String, originator: Originator) -> &ChatMessage {
        let now = Utc::now();
        // keep sequence order equal to timestamp order
        let sent_at = match self.messages.last() {
            Some(last) if last.sent_at() > now => last.sent_at(),
            _ => now,
        };

        let id = self.next_id;
        self.next_id = id.next();
        self.messages
            .push(ChatMessage::new(id, text, originator, sent_at));
        self.touch();
        &self.messages[self.messages.len() - 1]
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable view of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub pending: bool,
    pub messages: Vec<ChatMessage>,
}
