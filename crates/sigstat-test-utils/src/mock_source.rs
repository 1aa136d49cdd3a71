// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`MessageSource`] for deterministic tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use sigstat_core::{Message, MessageSource, SigstatError};
use tokio::sync::Mutex;

/// Returns a fixed message list and counts how often it was asked.
///
/// [`MockSource::failing`] builds one that always errors.
pub struct MockSource {
    messages: Mutex<Vec<Message>>,
    failure: Option<String>,
    loads: AtomicUsize,
}

impl MockSource {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages: Mutex::new(messages),
            failure: None,
            loads: AtomicUsize::new(0),
        }
    }

    /// A source whose every load fails with a store access error.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(Vec::new())
        }
    }

    /// Replace the messages returned by subsequent loads.
    pub async fn set_messages(&self, messages: Vec<Message>) {
        *self.messages.lock().await = messages;
    }

    /// Number of completed `load_messages` calls.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn load_messages(&self) -> Result<Vec<Message>, SigstatError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(SigstatError::StoreAccess {
                message: message.clone(),
                source: None,
            });
        }
        Ok(self.messages.lock().await.clone())
    }
}
