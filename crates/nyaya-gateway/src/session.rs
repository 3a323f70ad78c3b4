//! Session management for chat windows

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use nyaya_core::{ChatSession, ReplySource, SendOutcome, SessionId, SessionSnapshot};

use crate::{GatewayError, Result};

/// Session manager - owns every live chat session
pub struct SessionManager {
    /// Active sessions
    sessions: Arc<RwLock<HashMap<SessionId, ChatSession>>>,

    /// Idle timeout in seconds
    timeout_secs: u64,

    /// Greeting for new sessions
    greeting: Option<String>,
}

impl SessionManager {
    pub fn new(timeout_secs: u64, greeting: Option<String>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            timeout_secs,
            greeting,
        }
    }

    /// Create a new session
    pub fn create_session(&self) -> SessionSnapshot {
        let session = match &self.greeting {
            Some(greeting) => ChatSession::greeted(greeting.clone()),
            None => ChatSession::new(),
        };
        let snapshot = session.snapshot();

        self.sessions.write().insert(session.id.clone(), session);
        tracing::info!("Session created: {}", snapshot.id);
        snapshot
    }

    /// Get a session snapshot by ID
    pub fn get_session(&self, id: &SessionId) -> Option<SessionSnapshot> {
        self.sessions.read().get(id).map(|s| s.snapshot())
    }

    /// End a session
    pub fn end_session(&self, id: &SessionId) -> Result<()> {
        if self.sessions.write().remove(id).is_some() {
            tracing::info!("Session ended: {}", id);
            Ok(())
        } else {
            Err(GatewayError::SessionNotFound(id.to_string()))
        }
    }

    /// Send a message in a session and wait for the reply.
    ///
    /// The session lock is released while the reply source runs. Fetching
    /// and recording the reply happen on their own task, so a dropped
    /// request still completes the send and clears the pending flag.
    pub async fn send_message(
        &self,
        id: &SessionId,
        text: &str,
        source: Arc<dyn ReplySource>,
    ) -> Result<(SendOutcome, SessionSnapshot)> {
        let pending = {
            let mut sessions = self.sessions.write();
            let session = sessions
                .get_mut(id)
                .ok_or_else(|| GatewayError::SessionNotFound(id.to_string()))?;
            match session.begin_send(text) {
                Some(pending) => pending,
                None => return Ok((SendOutcome::Ignored, session.snapshot())),
            }
        };

        let sessions = self.sessions.clone();
        let id = id.clone();
        tokio::spawn(async move {
            let reply = source.fetch_reply(pending.query()).await;

            let mut sessions = sessions.write();
            let finished = match sessions.get_mut(&id) {
                Some(session) => {
                    let outcome = session.finish_send(pending, reply);
                    Ok((outcome, session.snapshot()))
                }
                None => Err(GatewayError::SessionNotFound(id.to_string())),
            };
            finished
        })
        .await
        .map_err(|e| GatewayError::Internal(format!("reply task failed: {}", e)))?
    }

    /// Clean up expired sessions
    pub fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|id, session| {
            let expired = session.is_expired(self.timeout_secs);
            if expired {
                tracing::info!("Session expired and removed: {}", id);
            }
            !expired
        });
        before - sessions.len()
    }

    /// Get session count
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Sessions currently waiting on a reply
    pub fn pending_count(&self) -> usize {
        self.sessions
            .read()
            .values()
            .filter(|s| s.is_pending())
            .count()
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("sessions", &self.session_count())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
