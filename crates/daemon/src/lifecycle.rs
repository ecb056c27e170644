// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: startup, serve, cooperative shutdown.

use crate::auth::AuthConfig;
use crate::config::Config;
use crate::coordinator::{spawn_sync_ticker, Coordinator};
use crate::server::{metrics_router, router, AppState};
use icepeak_core::{StoreMetrics, SystemClock};
use icepeak_storage::{PersistenceError, PersistentValue};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Startup and serve errors, surfaced to the operator.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: std::io::Error },

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Initialize tracing from `RUST_LOG`, defaulting to info.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Load the store, spawn the coordinator and sync ticker, and serve until
/// ctrl-c. Shutdown drains the queue and runs a final sync.
pub async fn run(config: Config) -> Result<(), LifecycleError> {
    let metrics = Arc::new(StoreMetrics::default());
    let store = PersistentValue::load(config.storage(), Arc::clone(&metrics), SystemClock)?;
    let reader = store.reader();
    info!(data_file = %config.data_file.display(), journaling = config.journaling, "store loaded");

    let (coordinator, handle) = Coordinator::new(store, Arc::clone(&metrics), config.queue_capacity);
    let coordinator_task = tokio::spawn(coordinator.run());
    let ticker = spawn_sync_ticker(handle.clone(), config.sync_every());

    let auth = config.resolved_jwt_secret().map(|secret| Arc::new(AuthConfig::new(secret.as_bytes())));
    if auth.is_none() {
        warn!("no JWT secret configured; requests are not authenticated");
    }

    if let Some(metrics_port) = config.metrics_port {
        let addr = SocketAddr::from(([0, 0, 0, 0], metrics_port));
        let listener =
            TcpListener::bind(addr).await.map_err(|source| LifecycleError::Bind { addr, source })?;
        info!(%addr, "metrics listening");
        let app = metrics_router(Arc::clone(&metrics));
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                warn!(error = %e, "metrics server stopped");
            }
        });
    }

    let state = AppState {
        reader,
        coordinator: handle.clone(),
        auth,
        channel_capacity: config.channel_capacity,
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener =
        TcpListener::bind(addr).await.map_err(|source| LifecycleError::Bind { addr, source })?;
    info!(%addr, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Connections are drained; stop the ticker, then let the coordinator
    // finish queued commands and run its final sync.
    info!("shutting down");
    ticker.abort();
    let _ = handle.shutdown().await;
    let _ = coordinator_task.await;
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
