//! Nyaya Sathi Gateway - HTTP surface of the legal assistant
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Nyaya Sathi Gateway                     │
//! ├──────────────────────────────────────────────────────────┤
//! │   POST /api/chatbot     /api/sessions/*     /api/report   │
//! │          │                    │                  │        │
//! │          │          ┌─────────▼────────┐  ┌──────▼─────┐  │
//! │          │          │ Session Manager  │  │ ReportForm │  │
//! │          │          └─────────┬────────┘  └────────────┘  │
//! │          │                    │                           │
//! │   ┌──────▼───────┐   ┌────────▼────────┐                  │
//! │   │ProcessBridge │   │  ReplySource    │                  │
//! │   │ (per request)│   │ process|remote  │                  │
//! │   └──────────────┘   └─────────────────┘                  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Features
//!
//! - **Chatbot adapter**: one backend process per message, errors in-band
//! - **Chat sessions**: server-held conversations with a pending flag
//! - **FIR composer**: validation and a plain-text preview

pub mod config;
pub mod error;
pub mod gateway;
pub mod session;

pub use config::{BackendMode, GatewayConfig};
pub use error::{GatewayError, Result};
pub use gateway::{ChatReply, ChatRequest, Gateway, GatewayState};
pub use session::SessionManager;

/// Gateway version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 18789;

/// Default host
pub const DEFAULT_HOST: &str = "127.0.0.1";
