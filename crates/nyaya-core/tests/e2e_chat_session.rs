//! E2E Test: chat session against a scripted backend
//!
//! Walks a conversation through greeting, answered questions, a backend
//! outage and blank input.

use async_trait::async_trait;
use nyaya_core::{
    ChatSession, CoreError, Originator, ReplySource, SendOutcome, DEFAULT_GREETING,
};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Answers the first two questions, then fails
struct FlakyBackend {
    calls: AtomicUsize,
}

#[async_trait]
impl ReplySource for FlakyBackend {
    async fn fetch_reply(&self, message: &str) -> nyaya_core::Result<String> {
        match self.calls.fetch_add(1, Ordering::SeqCst) {
            0 => Ok(format!(
                "Context:\nBNS Section: 318\nSubject: Cheating\nWhoever cheats shall be punished.\nQuestion: {}\nAnswer: Cheating is punishable under Section 318.",
                message
            )),
            1 => Ok("Sorry, I couldn't find relevant legal information in the provided context.".to_string()),
            _ => Err(CoreError::bridge("⚠️ Backend error:\nconnection refused")),
        }
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

#[tokio::test]
async fn e2e_conversation() {
    let backend = FlakyBackend {
        calls: AtomicUsize::new(0),
    };
    let mut session = ChatSession::greeted(DEFAULT_GREETING);

    // Structured answer is reformatted
    let outcome = session.send("Is online fraud cheating?", &backend).await;
    let reply = match outcome {
        SendOutcome::Replied { reply, .. } => reply,
        other => panic!("expected a reply, got {:?}", other),
    };
    assert!(reply.text().contains("Section 318"));
    assert!(reply.text().contains("Cheating is punishable"));

    // Unstructured answer is shown verbatim
    let outcome = session.send("What about weather?", &backend).await;
    assert_eq!(
        outcome.display_text(),
        Some("Sorry, I couldn't find relevant legal information in the provided context.")
    );

    // Outage: user message kept, nothing appended for the assistant
    let before = session.len();
    let outcome = session.send("Can I get bail?", &backend).await;
    assert!(matches!(outcome, SendOutcome::Failed { .. }));
    assert_eq!(session.len(), before + 1);
    assert!(!session.is_pending());

    // Blank input never reaches the backend
    let outcome = session.send(" \n ", &backend).await;
    assert_eq!(outcome, SendOutcome::Ignored);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 3);

    let originators: Vec<Originator> = session.messages().iter().map(|m| m.originator()).collect();
    assert_eq!(
        originators,
        vec![
            Originator::Assistant,
            Originator::User,
            Originator::Assistant,
            Originator::User,
            Originator::Assistant,
            Originator::User,
        ]
    );
}
