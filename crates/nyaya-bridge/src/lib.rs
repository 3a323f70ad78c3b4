//! Nyaya Sathi Bridges - reaching the question-answering backend
//!
//! Two [`nyaya_core::ReplySource`] implementations:
//!
//! - [`ProcessBridge`] spawns the backend program once per query and
//!   relays its stdout, or its stderr behind an error prefix.
//! - [`RemoteBridge`] posts the query to the hosted backend over HTTP.

pub mod error;
pub mod process;
pub mod remote;

pub use error::{BridgeError, Result};
pub use process::{
    BridgePayload, ProcessBridge, ProcessOutput, DEFAULT_INTERPRETER, DEFAULT_SCRIPT,
    PROCESS_ERROR_PREFIX,
};
pub use remote::{RemoteBridge, DEFAULT_ENDPOINT};
