//! Nyaya Sathi Gateway Binary
//!
//! # Usage
//! ```bash
//! nyaya-gateway [--port 18789] [--host 127.0.0.1] [--config gateway.json] [--verbose]
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use nyaya_gateway::{BackendMode, Gateway, GatewayConfig};
use tracing_subscriber::EnvFilter;

/// Nyaya Sathi Gateway - legal assistant chat bridge and FIR composer
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides the config file)
    #[arg(long)]
    host: Option<String>,

    /// Reply source for chat sessions
    #[arg(long, value_enum)]
    backend: Option<BackendMode>,

    /// Directory backend paths are resolved against
    #[arg(long)]
    working_dir: Option<PathBuf>,

    /// Hosted backend endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("debug"))
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    let mut config = match &args.config {
        Some(path) => GatewayConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path))?,
        None => GatewayConfig::default(),
    };
    if let Some(host) = args.host {
        config = config.with_host(host);
    }
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    if let Some(mode) = args.backend {
        config = config.with_backend_mode(mode);
    }
    if let Some(dir) = args.working_dir {
        config = config.with_working_dir(dir);
    }
    if let Some(endpoint) = args.endpoint {
        config = config.with_endpoint(endpoint);
    }

    print_banner(&config);

    let gateway = Gateway::new(config).context("invalid gateway configuration")?;
    gateway.start().await?;

    Ok(())
}

fn print_banner(config: &GatewayConfig) {
    println!();
    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║              ⚖️  NYAYA SATHI — LEGAL ASSISTANT  ⚖️              ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!();
    println!("📡 HTTP Server");
    println!("   └─ http://{}:{}", config.host, config.port);
    println!();
    println!("🔗 Endpoints");
    println!("   ├─ POST   /api/chatbot                — One-shot question");
    println!("   ├─ POST   /api/sessions               — Open a chat session");
    println!("   ├─ GET    /api/sessions/:id           — Session messages");
    println!("   ├─ POST   /api/sessions/:id/messages  — Send a message");
    println!("   ├─ DELETE /api/sessions/:id           — Close a session");
    println!("   ├─ POST   /api/report                 — FIR preview");
    println!("   ├─ GET    /api/report/incident-types  — Incident types");
    println!("   ├─ GET    /health                     — Health check");
    println!("   └─ GET    /status                     — Gateway status");
    println!();
    println!("🧠 Backend: {:?}", config.backend.mode);
    println!();
    println!("─────────────────────────────────────────────────────────────────");
    println!("Press Ctrl+C to stop the gateway");
    println!();
}
