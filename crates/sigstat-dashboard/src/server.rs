// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dashboard HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the dashboard.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{Router, routing::get};
use sigstat_core::{Conversation, SigstatError};
use sigstat_store::RefreshCache;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct DashboardState {
    /// Message table, refreshed when stale.
    pub cache: Arc<RefreshCache>,
    /// Conversations fetched once at startup, for the selector.
    pub conversations: Arc<Vec<Conversation>>,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
    /// Silence that separates conversation segments.
    pub gap: Duration,
}

impl DashboardState {
    pub fn new(cache: Arc<RefreshCache>, conversations: Vec<Conversation>, gap: Duration) -> Self {
        Self {
            cache,
            conversations: Arc::new(conversations),
            start_time: Instant::now(),
            gap,
        }
    }
}

/// Dashboard bind settings (mirrors the `[dashboard]` config section).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

/// Build the dashboard router.
///
/// - GET /
/// - GET /health
/// - GET /api/conversations
/// - GET /api/figures/{name}?conversation=<id>&value=<metric>
pub fn router(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/conversations", get(handlers::conversations))
        .route("/api/figures/{name}", get(handlers::figure))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the dashboard until `shutdown` resolves.
pub async fn serve<F>(config: &ServerConfig, state: DashboardState, shutdown: F) -> Result<(), SigstatError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SigstatError::Internal(format!("failed to bind dashboard to {addr}: {e}")))?;

    info!(%addr, conversations = state.conversations.len(), "dashboard listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| SigstatError::Internal(format!("dashboard server error: {e}")))?;

    info!("dashboard stopped");
    Ok(())
}
