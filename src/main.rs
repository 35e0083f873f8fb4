//! fanout-demo server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ http::server (request id, trace span, timeout, limits)
//!                        │
//!            ┌───────────┴─────────────┐
//!            ▼                         ▼
//!     http::users                http::demo
//!            │                         │
//!            ▼                         ▼
//!     store::UserRepository      fanout::FanOutDemo
//!     (PostgreSQL | memory)      ├── operation_a ─┐
//!                                └── operation_b ─┴─ join
//!
//!     Cross-cutting: config, observability (logs, spans → agent, metrics),
//!                    lifecycle (startup, signals, graceful shutdown)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use fanout_demo::config::load_config;
use fanout_demo::http::HttpServer;
use fanout_demo::lifecycle::{signals, startup, startup::StartupError, Shutdown};
use fanout_demo::observability::{self, metrics};

#[derive(Parser)]
#[command(name = "fanout-demo")]
#[command(about = "User records over HTTP plus a concurrent fan-out demo", long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    observability::init_logging(&config.observability)?;

    tracing::info!("fanout-demo v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        database = config.database.url.is_some(),
        operation_a = %config.demo.operation_a.label,
        operation_b = %config.demo.operation_b.label,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let users = startup::build_repository(&config.database).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config, users)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
