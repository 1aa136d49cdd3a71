// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sigstat dashboard` command implementation.

use std::sync::Arc;

use sigstat_config::model::SigstatConfig;
use sigstat_core::SigstatError;
use sigstat_dashboard::{DashboardState, ServerConfig, serve};
use sigstat_store::{RefreshCache, StoreSource, fetch_conversations};
use tracing::{info, warn};

/// Run the `sigstat dashboard` command.
///
/// Conversations are fetched once up front; messages go through a refresh
/// cache so a running dashboard picks up new messages.
pub async fn run_dashboard(config: &SigstatConfig) -> Result<(), SigstatError> {
    let source = StoreSource::from_config(&config.store);
    let conversations = fetch_conversations(source.store(), None).await?;
    info!(conversations = conversations.len(), "conversations loaded");

    let cache = Arc::new(RefreshCache::new(Arc::new(source), config.cache.staleness()));
    // An unreadable store fails the command here, before binding.
    cache.get_messages().await?;

    let state = DashboardState::new(cache, conversations, config.dashboard.conversation_gap());
    let server = ServerConfig {
        bind_address: config.dashboard.bind_address.clone(),
        port: config.dashboard.port,
    };
    serve(&server, state, shutdown_signal()).await
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("received SIGINT (Ctrl+C), shutting down"),
                    _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                let _ = ctrl_c.await;
                info!("received Ctrl+C, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        info!("received Ctrl+C, shutting down");
    }
}
