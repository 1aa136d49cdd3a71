// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message source trait consumed by the refresh cache.

use async_trait::async_trait;

use crate::error::SigstatError;
use crate::types::Message;

/// Anything able to produce the full, normalized message table.
///
/// The encrypted store implements this by running the decrypt, query, and
/// normalize pipeline once per call. Implementations must return messages
/// ordered by sent time ascending.
#[async_trait]
pub trait MessageSource: Send + Sync + 'static {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// Load every message. Each call is one complete fetch.
    async fn load_messages(&self) -> Result<Vec<Message>, SigstatError>;
}
