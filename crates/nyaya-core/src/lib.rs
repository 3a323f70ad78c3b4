//! Nyaya Sathi Core - chat sessions, reply formatting and FIR reports
//!
//! This crate holds everything in Nyaya Sathi that does not touch the
//! network or the operating system:
//!
//! 1. **Messages** (`message`): immutable chat messages with monotonic ids
//! 2. **Reply Formatter** (`formatter`): turns the backend's
//!    `Context: / Question: / Answer:` replies into display Markdown
//! 3. **Chat Session** (`session`): append-only conversation with a pending flag
//! 4. **Report Form** (`report`): FIR field record, validation and preview
//! 5. **Reply Sources** (`source`): the seam the bridges plug into
//!
//! # Quick Start
//!
//! ```
//! use nyaya_core::formatter::format_reply;
//!
//! let raw = "Context:\nBNS Section: 303\nSubject: Theft\nWhoever commits theft...\nQuestion: what is theft?\nAnswer: Taking movable property dishonestly.";
//! let shown = format_reply(raw);
//!
//! assert!(shown.contains("Section 303"));
//! assert!(!shown.contains("BNS Section:"));
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms, missing_debug_implementations, clippy::all)]

pub mod error;
pub mod formatter;
pub mod message;
pub mod report;
pub mod session;
pub mod source;

pub use error::{CoreError, Result};
pub use formatter::{format_reply, parse_reply, ContextBlock, MalformedReply, ReplyLayout};
pub use message::{ChatMessage, MessageId, Originator};
pub use report::{ReportField, ReportForm, ReportPreview, ReportRecord, INCIDENT_TYPES};
pub use session::{ChatSession, PendingSend, SendOutcome, SessionId, SessionSnapshot, DEFAULT_GREETING};
pub use source::ReplySource;

// Re-export for convenience
pub use chrono::{DateTime, Utc};
