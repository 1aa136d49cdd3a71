// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for sigstat.

use thiserror::Error;

/// The primary error type shared by the store, analysis, and command layers.
#[derive(Debug, Error)]
pub enum SigstatError {
    /// Missing or unusable key file, or an invalid configuration value.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Connection, decryption, or query failure against the encrypted store.
    ///
    /// Always fatal. A wrong key does not become right on retry.
    #[error("store access error: {message}")]
    StoreAccess {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Unrecognized conversation type filter.
    #[error("invalid conversation type `{0}`, expected `private` or `group`")]
    InvalidFilter(String),

    /// A single message row could not be normalized.
    #[error("malformed record {id}: {reason}")]
    MalformedRecord { id: String, reason: String },

    /// Filesystem failure while writing export artifacts.
    #[error("export error: {message}")]
    Export {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SigstatError {
    /// Build a [`SigstatError::StoreAccess`] that keeps the driver error as its source.
    pub fn store_access<E>(context: &str, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::StoreAccess {
            message: format!("{context}: {err}"),
            source: Some(Box::new(err)),
        }
    }

    /// Build a [`SigstatError::Export`] from an I/O (or similar) failure.
    pub fn export<E>(context: impl std::fmt::Display, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Export {
            message: format!("{context}: {err}"),
            source: Some(Box::new(err)),
        }
    }
}
