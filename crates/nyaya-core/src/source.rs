//! Reply sources
//!
//! A reply source turns one user message into the backend's raw reply text.
//! The process and remote bridges in `nyaya-bridge` implement it; tests use
//! in-memory stubs.

use async_trait::async_trait;

use crate::Result;

/// Anything that can answer a chat message
#[async_trait]
pub trait ReplySource: Send + Sync {
    /// Fetch the raw, unformatted reply for `message`.
    ///
    /// Failures carry a displayable message in [`crate::CoreError::Bridge`].
    async fn fetch_reply(&self, message: &str) -> Result<String>;

    /// Short name used in logs and status output
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: ReplySource + ?Sized> ReplySource for std::sync::Arc<T> {
    async fn fetch_reply(&self, message: &str) -> Result<String> {
        (**self).fetch_reply(message).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
