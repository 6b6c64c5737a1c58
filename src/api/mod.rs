//! HTTP surface for the issue tracker.
//!
//! A single resource, `/api/issues/:project`, supports list (GET), create
//! (POST), partial update (PUT) and delete (DELETE). Errors on that path are
//! reported in the body with HTTP 200.

pub mod issues;
pub mod request;
pub mod router;
pub mod state;

use std::sync::Arc;

use anyhow::Context;
use tickets_lib::{SharedStore, TicketStore};

use crate::config::ServerConfig;

pub use router::issue_router;
pub use state::{ApiConfig, AppState};

/// Open the store described by `config`.
///
/// # Errors
///
/// Returns an error if the JSONL file cannot be created or loaded.
pub fn open_store(config: &ServerConfig) -> anyhow::Result<Arc<dyn TicketStore>> {
    let store = match &config.data_path {
        Some(path) => SharedStore::open(path)
            .with_context(|| format!("failed to open ticket file {}", path.display()))?,
        None => {
            tracing::warn!("No data_path configured; tickets are kept in memory only");
            SharedStore::in_memory()
        }
    };
    Ok(Arc::new(store))
}

/// Bind the configured address and serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the store cannot be opened, the address cannot be
/// bound, or the server fails.
pub async fn serve(config: &ServerConfig) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let state = AppState::with_config(store, config.api_config());
    let router = issue_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind))?;
    let local_addr = listener.local_addr().context("failed to read bound address")?;

    tracing::info!(
        addr = %local_addr,
        data_path = ?config.data_path,
        "Starting issue tracker API server"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
