//! Gateway configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use nyaya_bridge::{ProcessBridge, RemoteBridge, DEFAULT_ENDPOINT, DEFAULT_INTERPRETER, DEFAULT_SCRIPT};
use nyaya_core::{ReplySource, DEFAULT_GREETING};

use crate::{GatewayError, Result, DEFAULT_HOST, DEFAULT_PORT};

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Session configuration
    pub session: SessionSettings,

    /// Backend configuration
    pub backend: BackendSettings,

    /// Enable request tracing
    pub tracing: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            session: SessionSettings::default(),
            backend: BackendSettings::default(),
            tracing: true,
        }
    }
}

impl GatewayConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Choose where chat sessions get their replies
    pub fn with_backend_mode(mut self, mode: BackendMode) -> Self {
        self.backend.mode = mode;
        self
    }

    /// Set the directory backend paths are resolved against
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backend.process.working_dir = Some(dir.into());
        self
    }

    /// Set the hosted backend endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.backend.remote.endpoint = endpoint.into();
        self
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| GatewayError::InvalidConfig(format!("{}:{}: {}", self.host, self.port, e)))
    }

    /// Check the configuration before serving
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        if self.backend.process.program.trim().is_empty() {
            return Err(GatewayError::InvalidConfig(
                "backend.process.program must not be empty".to_string(),
            ));
        }
        url::Url::parse(&self.backend.remote.endpoint).map_err(|e| {
            GatewayError::InvalidConfig(format!(
                "backend.remote.endpoint {}: {}",
                self.backend.remote.endpoint, e
            ))
        })?;
        Ok(())
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Process bridge described by `backend.process`
    pub fn process_bridge(&self) -> ProcessBridge {
        let settings = &self.backend.process;
        let mut bridge = ProcessBridge::new(settings.program.clone());
        if let Some(script) = &settings.script {
            bridge = bridge.with_script(script);
        }
        if let Some(dir) = &settings.working_dir {
            bridge = bridge.with_working_dir(dir);
        }
        bridge
    }

    /// Reply source for chat sessions, per `backend.mode`
    pub fn reply_source(&self) -> Result<Arc<dyn ReplySource>> {
        match self.backend.mode {
            BackendMode::Process => Ok(Arc::new(self.process_bridge())),
            BackendMode::Remote => Ok(Arc::new(RemoteBridge::new(&self.backend.remote.endpoint)?)),
        }
    }
}

/// Session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Idle time after which a session is dropped, in seconds
    pub timeout_secs: u64,

    /// How often expired sessions are purged, in seconds
    pub cleanup_interval_secs: u64,

    /// Assistant greeting opening every session (none when unset)
    pub greeting: Option<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 3600, // 1 hour
            cleanup_interval_secs: 60,
            greeting: Some(DEFAULT_GREETING.to_string()),
        }
    }
}

/// Where chat sessions get their replies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    /// Spawn the local backend program per message
    #[default]
    Process,
    /// Call the hosted backend over HTTP
    Remote,
}

/// Backend settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Reply source for chat sessions. `/api/chatbot` always uses the process.
    pub mode: BackendMode,

    pub process: ProcessSettings,

    pub remote: RemoteSettings,
}

/// Local backend program
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessSettings {
    /// Program or interpreter to run
    pub program: String,

    /// Script passed before the query
    pub script: Option<PathBuf>,

    /// Base for relative paths (current directory when unset)
    pub working_dir: Option<PathBuf>,
}

impl Default for ProcessSettings {
    fn default() -> Self {
        Self {
            program: DEFAULT_INTERPRETER.to_string(),
            script: Some(PathBuf::from(DEFAULT_SCRIPT)),
            working_dir: None,
        }
    }
}

/// Hosted backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    pub endpoint: String,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}
