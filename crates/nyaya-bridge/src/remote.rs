//! Remote bridge - the hosted question-answering service
//!
//! Posts `{"message": ...}` to the backend endpoint and reads the raw,
//! unformatted `{"reply": ...}` back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use nyaya_core::ReplySource;

use crate::error::{BridgeError, Result};

/// Hosted backend endpoint
pub const DEFAULT_ENDPOINT: &str = "https://backend-nyasathi-1.onrender.com/query";

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    reply: String,
}

/// HTTP client for the hosted backend
#[derive(Debug, Clone)]
pub struct RemoteBridge {
    endpoint: Url,
    http_client: reqwest::Client,
}

impl RemoteBridge {
    /// Create a bridge for `endpoint`
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Self {
            endpoint: Url::parse(endpoint)?,
            http_client: reqwest::Client::new(),
        })
    }

    /// Use a preconfigured HTTP client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = client;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send one message and return the raw reply text
    pub async fn query(&self, message: &str) -> Result<String> {
        let response = self
            .http_client
            .post(self.endpoint.clone())
            .json(&QueryRequest { message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::Status { status, body });
        }

        let data: QueryResponse = response.json().await?;
        tracing::debug!("✅ Backend replied with {} bytes", data.reply.len());
        Ok(data.reply)
    }
}

#[async_trait]
impl ReplySource for RemoteBridge {
    async fn fetch_reply(&self, message: &str) -> nyaya_core::Result<String> {
        self.query(message).await.map_err(|e| {
            tracing::error!("❌ Chatbot backend error: {}", e);
            e.into()
        })
    }

    fn name(&self) -> &str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn serve(router: Router) -> anyhow::Result<String> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Ok(format!("http://{}/query", addr))
    }

    #[tokio::test]
    async fn test_query_returns_raw_reply() -> anyhow::Result<()> {
        let router = Router::new().route(
            "/query",
            post(|Json(body): Json<Value>| async move {
                Json(json!({ "reply": format!("Context:\nQuestion: {}\nAnswer: ok", body["message"].as_str().unwrap_or_default()) }))
            }),
        );
        let bridge = RemoteBridge::new(&serve(router).await?)?;

        let reply = bridge.query("is theft bailable?").await?;
        assert_eq!(reply, "Context:\nQuestion: is theft bailable?\nAnswer: ok");
        Ok(())
    }

    #[tokio::test]
    async fn test_error_status_is_reported() -> anyhow::Result<()> {
        let router = Router::new().route(
            "/query",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model offline") }),
        );
        let bridge = RemoteBridge::new(&serve(router).await?)?;

        let err = bridge.query("q").await.unwrap_err();
        assert!(matches!(err, BridgeError::Status { .. }));
        assert!(err.to_string().contains("model offline"));

        let core_err = bridge.fetch_reply("q").await.unwrap_err();
        assert!(core_err.to_string().contains("500"));
        Ok(())
    }

    #[tokio::test]
    async fn test_unexpected_body_is_error() -> anyhow::Result<()> {
        let router = Router::new().route("/query", post(|| async { Json(json!({ "answer": "x" })) }));
        let bridge = RemoteBridge::new(&serve(router).await?)?;

        assert!(matches!(bridge.query("q").await, Err(BridgeError::Http(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_error() -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        drop(listener);

        let bridge = RemoteBridge::new(&format!("http://{}/query", addr))?;
        assert!(bridge.fetch_reply("q").await.is_err());
        Ok(())
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(matches!(
            RemoteBridge::new("not a url"),
            Err(BridgeError::InvalidEndpoint(_))
        ));
        assert_eq!(
            RemoteBridge::new(DEFAULT_ENDPOINT).unwrap().endpoint().as_str(),
            DEFAULT_ENDPOINT
        );
    }
}
