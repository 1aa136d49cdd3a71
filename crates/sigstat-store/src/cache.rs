// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-slot refresh cache over a [`MessageSource`].
//!
//! The slot holds the last full message table and the instant it was
//! fetched. Reads older than the staleness threshold trigger one refetch.
//! Staleness is only checked on access; there is no background timer.

use std::sync::Arc;
use std::time::Duration;

use sigstat_core::{Message, MessageSource, SigstatError};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

struct Entry {
    messages: Vec<Message>,
    fetched_at: Instant,
}

/// Time-bounded cache of the full message table.
pub struct RefreshCache {
    source: Arc<dyn MessageSource>,
    staleness: Duration,
    slot: Mutex<Option<Entry>>,
}

impl RefreshCache {
    pub fn new(source: Arc<dyn MessageSource>, staleness: Duration) -> Self {
        Self {
            source,
            staleness,
            slot: Mutex::new(None),
        }
    }

    pub fn staleness(&self) -> Duration {
        self.staleness
    }

    /// Return the cached messages, refetching first when the slot is empty
    /// or older than the staleness threshold.
    ///
    /// The lock is held across the check and the refetch, so concurrent
    /// callers wait for a single refresh instead of starting their own. A
    /// failed refetch leaves the previous entry in place and is returned.
    pub async fn get_messages(&self) -> Result<Vec<Message>, SigstatError> {
        let mut slot = self.slot.lock().await;

        let fresh = slot
            .as_ref()
            .is_some_and(|entry| entry.fetched_at.elapsed() <= self.staleness);
        if !fresh {
            debug!(source = self.source.name(), "refreshing message cache");
            let messages = self.source.load_messages().await?;
            debug!(messages = messages.len(), "message cache refreshed");
            *slot = Some(Entry {
                messages,
                fetched_at: Instant::now(),
            });
        }

        Ok(slot
            .as_ref()
            .map(|entry| entry.messages.clone())
            .unwrap_or_default())
    }

    /// Drop the cached entry so the next read refetches.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }

    /// Age of the cached entry, if any.
    pub async fn age(&self) -> Option<Duration> {
        self.slot
            .lock()
            .await
            .as_ref()
            .map(|entry| entry.fetched_at.elapsed())
    }
}
