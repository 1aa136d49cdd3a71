// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`MessageSource`] backed by the encrypted store.

use async_trait::async_trait;
use sigstat_config::model::{MalformedPolicy, StoreConfig};
use sigstat_core::{Message, MessageSource, SigstatError};

use crate::database::SignalStore;
use crate::queries::messages::fetch_messages;

/// Runs the full decrypt, query, normalize pipeline on every load.
#[derive(Debug, Clone)]
pub struct StoreSource {
    store: SignalStore,
    include_expiring: bool,
    policy: MalformedPolicy,
}

impl StoreSource {
    pub fn new(store: SignalStore, include_expiring: bool, policy: MalformedPolicy) -> Self {
        Self {
            store,
            include_expiring,
            policy,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(
            SignalStore::from_config(config),
            config.include_expiring,
            config.on_malformed,
        )
    }

    pub fn store(&self) -> &SignalStore {
        &self.store
    }
}

#[async_trait]
impl MessageSource for StoreSource {
    fn name(&self) -> &str {
        "signal-store"
    }

    async fn load_messages(&self) -> Result<Vec<Message>, SigstatError> {
        fetch_messages(&self.store, self.include_expiring, false, self.policy).await
    }
}
