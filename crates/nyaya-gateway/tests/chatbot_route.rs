//! E2E Test: stateless chatbot route
//!
//! Runs `/api/chatbot` against throwaway shell backends and checks the
//! in-band reply contract: always 200, formatted on success, prefixed
//! stderr on failure.

#![cfg(unix)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use nyaya_bridge::PROCESS_ERROR_PREFIX;
use nyaya_gateway::{BackendMode, Gateway, GatewayConfig};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

/// Gateway whose backend is `sh answer.sh <message>` with the given body
fn gateway_with_backend(script: &str) -> (TempDir, Gateway) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("answer.sh"), script).unwrap();

    let mut config = GatewayConfig::default()
        .with_port(0)
        .with_backend_mode(BackendMode::Process)
        .with_working_dir(dir.path());
    config.backend.process.program = "sh".to_string();
    config.backend.process.script = Some("answer.sh".into());

    (dir, Gateway::new(config).unwrap())
}

async fn post_json(gateway: &Gateway, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = gateway.build_router().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn e2e_chatbot_formats_backend_reply() {
    let (_dir, gateway) = gateway_with_backend(
        r#"printf 'Context:\nBNS Section: 303\nSubject: Theft\nWhoever commits theft shall be punished.\nQuestion: %s\nAnswer: Up to three years.\n' "$1""#,
    );

    let (status, body) = post_json(&gateway, "/api/chatbot", json!({ "message": "punishment for theft" })).await;

    assert_eq!(status, StatusCode::OK);
    let reply = body["reply"].as_str().unwrap();
    assert!(reply.starts_with("**🧠 Answer:**\nUp to three years."));
    assert!(reply.contains("🔹 **Section 303**"));
    assert!(reply.contains("📌 *Theft*"));
    assert!(reply.contains("> Whoever commits theft shall be punished."));
    assert!(!reply.contains("BNS Section:"));
}

#[tokio::test]
async fn e2e_chatbot_passes_unstructured_reply_through() {
    let (_dir, gateway) = gateway_with_backend(
        "echo \"Sorry, I couldn't find relevant legal information in the provided context.\"",
    );

    let (status, body) = post_json(&gateway, "/api/chatbot", json!({ "message": "weather?" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["reply"],
        "Sorry, I couldn't find relevant legal information in the provided context."
    );
}

#[tokio::test]
async fn e2e_chatbot_reports_backend_failure_in_band() {
    let (_dir, gateway) = gateway_with_backend("echo 'Missing GROQ_API_KEY' >&2; exit 1");

    let (status, body) = post_json(&gateway, "/api/chatbot", json!({ "message": "q" })).await;

    assert_eq!(status, StatusCode::OK);
    let reply = body["reply"].as_str().unwrap();
    assert!(reply.starts_with(PROCESS_ERROR_PREFIX));
    assert!(reply.contains("Missing GROQ_API_KEY"));
}

#[tokio::test]
async fn e2e_chatbot_reports_missing_backend_in_band() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = GatewayConfig::default().with_working_dir(dir.path());
    config.backend.process.program = "./missing-backend".to_string();
    config.backend.process.script = None;
    let gateway = Gateway::new(config).unwrap();

    let (status, body) = post_json(&gateway, "/api/chatbot", json!({ "message": "q" })).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["reply"].as_str().unwrap().starts_with(PROCESS_ERROR_PREFIX));
}

#[tokio::test]
async fn e2e_chatbot_empty_output_is_empty_reply() {
    let (_dir, gateway) = gateway_with_backend("exit 0");

    let (status, body) = post_json(&gateway, "/api/chatbot", json!({ "message": "q" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "");
}

#[tokio::test]
async fn e2e_session_failure_clears_pending() {
    let (_dir, gateway) = gateway_with_backend("echo 'index missing' >&2; exit 2");

    let (_, created) = post_json(&gateway, "/api/sessions", json!({})).await;
    let id = created["id"].as_str().unwrap();

    let (status, sent) = post_json(
        &gateway,
        &format!("/api/sessions/{}/messages", id),
        json!({ "message": "what is bail?" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent["status"], "failed");
    assert!(sent["reply"].as_str().unwrap().contains("index missing"));
    assert_eq!(sent["session"]["pending"], false);
    // greeting + user message, no assistant reply
    assert_eq!(sent["session"]["messages"].as_array().unwrap().len(), 2);
}
