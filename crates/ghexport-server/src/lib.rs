// SPDX-License-Identifier: Apache-2.0

//! HTTP front-end for ghexport-core.
//!
//! Serves a single route, `POST /api/github/export-full-project`, which
//! exports the configured project root into a new repository owned by the
//! caller's token.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::post;
use ghexport_core::{AppConfig, ClientFactory};
use tokio::net::TcpListener;
use tracing::{error, info};

pub mod error;
pub mod handler;
pub mod logging;

/// Route of the export endpoint.
pub const EXPORT_ROUTE: &str = "/api/github/export-full-project";

/// Shared state for handlers.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Builds a GitHub client per request token.
    pub clients: Arc<dyn ClientFactory>,
}

impl AppState {
    /// Creates handler state.
    pub fn new(config: AppConfig, clients: Arc<dyn ClientFactory>) -> Self {
        Self {
            config: Arc::new(config),
            clients,
        }
    }
}

/// Builds the application router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(EXPORT_ROUTE, post(handler::export_full_project))
        .with_state(state)
}

/// Run the HTTP server until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the address is invalid or the listener cannot bind.
pub async fn run_http(host: &str, port: u16, state: AppState) -> anyhow::Result<()> {
    info!("Starting ghexport HTTP server on {}:{}", host, port);

    // Handle both IPv4 and IPv6 addresses
    let addr: SocketAddr = if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
    .parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!(
        root = %state.config.export.project_root.display(),
        "HTTP server listening on {}", addr
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
            info!("Received Ctrl+C, shutting down gracefully");
        })
        .await?;

    Ok(())
}
