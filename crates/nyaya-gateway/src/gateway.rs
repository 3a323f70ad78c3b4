//! Main Gateway implementation
//!
//! HTTP surface of Nyaya Sathi: the stateless chatbot adapter, chat
//! sessions and the FIR composer.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use nyaya_bridge::{BridgePayload, ProcessBridge};
use nyaya_core::{
    format_reply, ReplySource, ReportForm, ReportPreview, ReportRecord, SendOutcome, SessionId,
    SessionSnapshot, INCIDENT_TYPES,
};

use crate::config::GatewayConfig;
use crate::session::SessionManager;
use crate::{GatewayError, Result};

/// Body of every chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Reply of the stateless chatbot route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Outcome of a session send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendStatus {
    Ignored,
    Replied,
    Failed,
}

/// Reply of a session send
#[derive(Debug, Clone, Serialize)]
pub struct SendResponse {
    pub status: SendStatus,
    pub reply: Option<String>,
    pub session: SessionSnapshot,
}

/// Reply of a successful FIR submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    pub preview: ReportPreview,
    pub document: String,
}

/// Gateway state shared across handlers
#[derive(Clone)]
pub struct GatewayState {
    pub config: GatewayConfig,
    pub session_manager: Arc<SessionManager>,
    pub process_bridge: Arc<ProcessBridge>,
    pub reply_source: Arc<dyn ReplySource>,
    pub shutdown_tx: broadcast::Sender<()>,
}

impl GatewayState {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Self {
            session_manager: Arc::new(SessionManager::new(
                config.session.timeout_secs,
                config.session.greeting.clone(),
            )),
            process_bridge: Arc::new(config.process_bridge()),
            reply_source: config.reply_source()?,
            config,
            shutdown_tx,
        })
    }

    /// Replace the reply source used by chat sessions
    pub fn with_reply_source(mut self, source: Arc<dyn ReplySource>) -> Self {
        self.reply_source = source;
        self
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("config", &self.config)
            .field("session_manager", &self.session_manager)
            .field("reply_source", &self.reply_source.name())
            .finish()
    }
}

/// Main Gateway
#[derive(Debug)]
pub struct Gateway {
    state: Arc<GatewayState>,
}

impl Gateway {
    /// Create a new gateway with configuration
    pub fn new(config: GatewayConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_state(GatewayState::new(config)?))
    }

    /// Create a gateway around prepared state
    pub fn from_state(state: GatewayState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Get gateway state
    pub fn state(&self) -> Arc<GatewayState> {
        self.state.clone()
    }

    /// Build the Axum router
    pub fn build_router(&self) -> Router {
        let router = Router::new()
            .route("/health", get(Self::handle_health))
            .route("/status", get(Self::handle_status))
            .route("/api/chatbot", post(Self::handle_chatbot))
            .route("/api/sessions", post(Self::handle_create_session))
            .route(
                "/api/sessions/:id",
                get(Self::handle_get_session).delete(Self::handle_end_session),
            )
            .route("/api/sessions/:id/messages", post(Self::handle_send_message))
            .route("/api/report", post(Self::handle_report))
            .route("/api/report/incident-types", get(Self::handle_incident_types))
            .layer(CorsLayer::permissive());

        let router = if self.state.config.tracing {
            router.layer(TraceLayer::new_for_http())
        } else {
            router
        };

        router.with_state(self.state.clone())
    }

    /// Start the gateway server
    pub async fn start(&self) -> Result<()> {
        let addr = self.state.config.socket_addr()?;
        let router = self.build_router();

        tracing::info!("⚖️ Nyaya Sathi gateway starting on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(GatewayError::Io)?;

        let reaper = Self::spawn_session_reaper(self.state.clone());
        let mut shutdown_rx = self.state.shutdown_tx.subscribe();

        let served = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_rx.recv() => {}
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Ctrl+C received");
                    }
                }
            })
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()));

        self.shutdown();
        let _ = reaper.await;
        served
    }

    /// Shutdown the gateway
    pub fn shutdown(&self) {
        let _ = self.state.shutdown_tx.send(());
        tracing::info!("Gateway shutdown initiated");
    }

    /// Periodically drop idle sessions until shutdown
    fn spawn_session_reaper(state: Arc<GatewayState>) -> JoinHandle<()> {
        let mut shutdown_rx = state.shutdown_tx.subscribe();
        let period = Duration::from_secs(state.config.session.cleanup_interval_secs.max(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = state.session_manager.cleanup_expired();
                        if removed > 0 {
                            tracing::debug!("Removed {} expired sessions", removed);
                        }
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }
            tracing::debug!("Session reaper stopped");
        })
    }

    // HTTP handlers

    async fn handle_health() -> impl IntoResponse {
        Json(serde_json::json!({
            "status": "healthy",
            "version": crate::VERSION
        }))
    }

    async fn handle_status(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
        Json(serde_json::json!({
            "version": crate::VERSION,
            "sessions": state.session_manager.session_count(),
            "pending": state.session_manager.pending_count(),
            "backend": state.reply_source.name(),
        }))
    }

    /// Stateless adapter: one process per message, always 200
    async fn handle_chatbot(
        State(state): State<Arc<GatewayState>>,
        Json(request): Json<ChatRequest>,
    ) -> Json<ChatReply> {
        let reply = match state.process_bridge.invoke(&request.message).await {
            BridgePayload::Success(raw) => format_reply(&raw),
            BridgePayload::Error(error) => error,
        };
        Json(ChatReply { reply })
    }

    async fn handle_create_session(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
        (StatusCode::CREATED, Json(state.session_manager.create_session()))
    }

    async fn handle_get_session(
        State(state): State<Arc<GatewayState>>,
        Path(id): Path<String>,
    ) -> Result<Json<SessionSnapshot>> {
        state
            .session_manager
            .get_session(&SessionId::from_str(&id))
            .map(Json)
            .ok_or(GatewayError::SessionNotFound(id))
    }

    async fn handle_end_session(
        State(state): State<Arc<GatewayState>>,
        Path(id): Path<String>,
    ) -> Result<StatusCode> {
        state.session_manager.end_session(&SessionId::from_str(&id))?;
        Ok(StatusCode::NO_CONTENT)
    }

    async fn handle_send_message(
        State(state): State<Arc<GatewayState>>,
        Path(id): Path<String>,
        Json(request): Json<ChatRequest>,
    ) -> Result<Json<SendResponse>> {
        let (outcome, session) = state
            .session_manager
            .send_message(
                &SessionId::from_str(&id),
                &request.message,
                state.reply_source.clone(),
            )
            .await?;

        let status = match &outcome {
            SendOutcome::Ignored => SendStatus::Ignored,
            SendOutcome::Replied { .. } => SendStatus::Replied,
            SendOutcome::Failed { .. } => SendStatus::Failed,
        };

        Ok(Json(SendResponse {
            status,
            reply: outcome.display_text().map(str::to_string),
            session,
        }))
    }

    async fn handle_report(Json(record): Json<ReportRecord>) -> Result<Json<ReportResponse>> {
        let mut form = ReportForm::with_record(record);
        let preview = form.submit()?;

        Ok(Json(ReportResponse {
            document: preview.render_text(),
            preview,
        }))
    }

    async fn handle_incident_types() -> Json<&'static [&'static str]> {
        Json(&INCIDENT_TYPES[..])
    }
}
