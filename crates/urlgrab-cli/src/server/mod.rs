//! Relay HTTP server: one endpoint answering `info` and `download` requests.

mod handler;
mod response;

use anyhow::{Context, Result};
use axum::{middleware, routing::any, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use urlgrab_core::config::{RelayConfig, TransferOptions};

/// Per-process settings shared by every request. Read-only.
#[derive(Debug, Clone)]
pub struct AppState {
    pub transfer: TransferOptions,
    pub upstream_status_passthrough: bool,
}

impl AppState {
    pub fn from_config(cfg: &RelayConfig) -> Self {
        Self {
            transfer: cfg.transfer_options(),
            upstream_status_passthrough: cfg.upstream_status_passthrough,
        }
    }
}

/// Builds the relay router. Every response, errors included, carries CORS headers.
pub fn router(cfg: &RelayConfig) -> Router {
    let state = Arc::new(AppState::from_config(cfg));
    Router::new()
        .route(&cfg.route_path, any(handler::relay))
        .with_state(state)
        .layer(middleware::map_response(response::apply_cors))
}

pub async fn bind(cfg: &RelayConfig) -> Result<TcpListener> {
    TcpListener::bind(&cfg.listen_addr)
        .await
        .with_context(|| format!("bind {}", cfg.listen_addr))
}

/// Serves the relay on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, cfg: &RelayConfig) -> Result<()> {
    let addr = listener.local_addr()?;
    info!("relay listening on http://{}{}", addr, cfg.route_path);

    axum::serve(listener, router(cfg))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
        })
        .await
        .context("relay server")
}
