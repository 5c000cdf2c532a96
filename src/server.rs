//! Server startup: open the store, build the router, serve until ctrl-c.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::cors::CorsLayer;

use crate::api::{api_router, AppState, SharedState};
use crate::config::ServerConfig;
use crate::db::{DbHandle, Store};

pub fn build_router(state: SharedState, dev_mode: bool) -> axum::Router {
    let router = api_router().with_state(state);
    if dev_mode {
        // Local frontends during development talk to the API cross-origin.
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

pub async fn start_server(config: ServerConfig) -> Result<()> {
    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let store = Store::new(&config.db_path)?;
    tracing::info!(db = %config.db_path.display(), "database ready");

    let state = Arc::new(AppState {
        db: DbHandle::new(store),
    });
    let app = build_router(state, config.dev_mode);

    let host: IpAddr = if config.dev_mode {
        Ipv4Addr::UNSPECIFIED.into()
    } else {
        Ipv4Addr::LOCALHOST.into()
    };
    let addr = SocketAddr::new(host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(%addr, dev_mode = config.dev_mode, "laneboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
