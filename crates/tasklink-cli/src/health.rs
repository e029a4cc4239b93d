//! Health endpoint: lets a hosting platform see the process is alive.

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tracing::{error, info};

pub const HEALTH_TEXT: &str = "WhatsApp Task Tracker is running";

pub fn health_routes() -> Router {
    Router::new().route("/", get(health))
}

async fn health() -> &'static str {
    HEALTH_TEXT
}

/// Bind `host:port`. Fails early so a taken port stops startup.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    let addr = format!("{host}:{port}");
    TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind health endpoint on {addr}"))
}

/// Serve until the task is dropped.
pub async fn serve(listener: TcpListener) {
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "health endpoint listening");
    }
    if let Err(e) = axum::serve(listener, health_routes()).await {
        error!(error = %e, "health endpoint stopped");
    }
}
