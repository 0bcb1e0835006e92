//! Sakumon · worksheet generation backend
//!
//! - Axum HTTP API (generate, fetch, grade)
//! - OpenAI integration for generation, embeddings and free-response grading
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                  : u16 (default 3031)
//!   OPENAI_API_KEY        : enables OpenAI integration if present
//!   OPENAI_BASE_URL       : default "https://api.openai.com/v1"
//!   LLM_MODEL             : default "gpt-4o-mini"
//!   OPENAI_EMBED_MODEL    : default "text-embedding-3-small"
//!   WORKSHEET_CONFIG_PATH : path to TOML config (prompt overrides + subject hints)
//!   LOG_LEVEL             : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT            : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};

use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

use sakumon_backend::routes::build_router;
use sakumon_backend::state::AppState;
use sakumon_backend::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let state = Arc::new(AppState::from_env());
  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3031)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "sakumon_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "sakumon_backend", "HTTP server stopped");
  Ok(())
}

/// Resolves on Ctrl+C or SIGTERM. If a handler cannot be installed, that
/// signal is simply never observed.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = signal::ctrl_c().await {
      warn!(target: "sakumon_backend", error = %e, "cannot listen for Ctrl+C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        warn!(target: "sakumon_backend", error = %e, "cannot listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => info!(target: "sakumon_backend", "received Ctrl+C, shutting down"),
    _ = terminate => info!(target: "sakumon_backend", "received SIGTERM, shutting down"),
  }
}
