//! Process bridge
//!
//! Answers a query by running the backend program once per request:
//!
//! ```text
//! <program> [script] <query>
//! ```
//!
//! stdout and stderr are drained concurrently until EOF, then the exit
//! status decides the payload. The child lives inside a [`ScopedChild`]
//! guard, so pipes are closed and the process is killed and reaped on
//! every exit path, including a dropped request future.

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

use nyaya_core::ReplySource;

use crate::error::{BridgeError, Result};

/// Prefix of every in-band error payload
pub const PROCESS_ERROR_PREFIX: &str = "⚠️ Backend error:\n";

/// Interpreter used by the stock backend
pub const DEFAULT_INTERPRETER: &str = "python";

/// Stock backend script, relative to the working directory
pub const DEFAULT_SCRIPT: &str = "backend/query_vector_db.py";

/// Captured result of one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Map the output to the single payload handed back to the caller
    pub fn into_payload(self) -> BridgePayload {
        if self.success() {
            BridgePayload::Success(self.stdout.trim().to_string())
        } else {
            BridgePayload::Error(format!("{}{}", PROCESS_ERROR_PREFIX, self.stderr))
        }
    }
}

/// Outcome of one bridge invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum BridgePayload {
    /// Trimmed stdout of a zero exit
    Success(String),
    /// Error prefix followed by stderr or the spawn error
    Error(String),
}

impl BridgePayload {
    pub fn is_success(&self) -> bool {
        matches!(self, BridgePayload::Success(_))
    }

    pub fn text(&self) -> &str {
        match self {
            BridgePayload::Success(text) | BridgePayload::Error(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            BridgePayload::Success(text) | BridgePayload::Error(text) => text,
        }
    }

    pub fn into_result(self) -> nyaya_core::Result<String> {
        match self {
            BridgePayload::Success(text) => Ok(text),
            BridgePayload::Error(text) => Err(nyaya_core::CoreError::Bridge(text)),
        }
    }
}

/// Owns a spawned child until it has been reaped
struct ScopedChild {
    child: Child,
    program: String,
    reaped: bool,
}

impl ScopedChild {
    fn spawn(command: &mut Command, program: &str) -> Result<Self> {
        let child = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| BridgeError::Spawn {
                program: program.to_string(),
                source,
            })?;

        Ok(Self {
            child,
            program: program.to_string(),
            reaped: false,
        })
    }

    /// Drain both pipes, then wait for the process to exit
    async fn collect(mut self) -> Result<ProcessOutput> {
        let stdout = self.child.stdout.take();
        let stderr = self.child.stderr.take();

        let (stdout, stderr) = tokio::try_join!(drain(stdout), drain(stderr))?;
        let status = self.child.wait().await?;
        self.reaped = true;

        Ok(ProcessOutput {
            exit_code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

impl Drop for ScopedChild {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        match self.child.start_kill() {
            Ok(()) => tracing::warn!("Killed unfinished backend process: {}", self.program),
            Err(e) => tracing::debug!("Backend process {} already gone: {}", self.program, e),
        }
    }
}

async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Runs the backend program once per query
#[derive(Debug, Clone)]
pub struct ProcessBridge {
    program: String,
    script: Option<PathBuf>,
    working_dir: PathBuf,
}

impl ProcessBridge {
    /// Bridge running `program <query>` from the current directory
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            script: None,
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// The stock `python backend/query_vector_db.py <query>` bridge
    pub fn stock() -> Self {
        Self::new(DEFAULT_INTERPRETER).with_script(DEFAULT_SCRIPT)
    }

    /// Pass `script` before the query (interpreter mode)
    pub fn with_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.script = Some(script.into());
        self
    }

    /// Directory relative paths are resolved against
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Script path after resolution, if any
    pub fn script_path(&self) -> Option<PathBuf> {
        self.script.as_ref().map(|s| self.working_dir.join(s))
    }

    /// Program path after resolution.
    ///
    /// Bare names (`python`) are left for `PATH` lookup; anything with a
    /// separator is resolved against the working directory.
    pub fn program_path(&self) -> PathBuf {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            self.working_dir.join(program)
        } else {
            program.to_path_buf()
        }
    }

    fn command(&self, query: &str) -> Command {
        let mut command = Command::new(self.program_path());
        if let Some(script) = self.script_path() {
            command.arg(script);
        }
        command.arg(query).current_dir(&self.working_dir);
        command
    }

    /// Run the backend and return its raw output
    pub async fn run(&self, query: &str) -> Result<ProcessOutput> {
        let mut command = self.command(query);
        let child = ScopedChild::spawn(&mut command, &self.program)?;
        child.collect().await
    }

    /// Run the backend and map the result to exactly one payload
    pub async fn invoke(&self, query: &str) -> BridgePayload {
        match self.run(query).await {
            Ok(output) => {
                if output.success() {
                    tracing::debug!(
                        "Backend process finished: {} bytes stdout, {} bytes stderr",
                        output.stdout.len(),
                        output.stderr.len()
                    );
                } else {
                    tracing::error!(
                        "❌ Backend process exited with {:?}: {}",
                        output.exit_code,
                        output.stderr
                    );
                }
                output.into_payload()
            }
            Err(e) => {
                tracing::error!("❌ Backend process failed: {}", e);
                BridgePayload::Error(format!("{}{}", PROCESS_ERROR_PREFIX, e))
            }
        }
    }
}

#[async_trait]
impl ReplySource for ProcessBridge {
    async fn fetch_reply(&self, message: &str) -> nyaya_core::Result<String> {
        self.invoke(message).await.into_result()
    }

    fn name(&self) -> &str {
        "process"
    }
}
