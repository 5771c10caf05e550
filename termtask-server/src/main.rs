//! `TermTask` reference server -- identity provider and task store.
//!
//! An axum HTTP server implementing the task API and its identity
//! boundary, backed by in-memory storage. Intended for integration
//! tests and local development.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 127.0.0.1:8787
//! cargo run --bin termtask-server
//!
//! # Run on custom address with a real secret
//! cargo run --bin termtask-server -- --bind 0.0.0.0:8080 \
//!     --token-secret "$(openssl rand -hex 32)"
//! ```

use std::sync::Arc;

use clap::Parser;
use termtask_server::config::{ServerCliArgs, ServerConfig};
use termtask_server::server::{self, AppState};

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing with the resolved log level.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if config.uses_default_secret() {
        tracing::warn!("using the built-in development token secret; set TERMTASK_TOKEN_SECRET");
    }

    tracing::info!(addr = %config.bind_addr, "starting termtask server");

    let state = Arc::new(AppState::new(&config.token_secret));

    match server::start_server_with_state(&config.bind_addr, state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start server");
            std::process::exit(1);
        }
    }
}
