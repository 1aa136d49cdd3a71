// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scoped, read-only connections to the encrypted Signal database.
//!
//! Every operation opens its own connection, keys it, runs its query on
//! tokio-rusqlite's background thread, and closes it again. Nothing is held
//! open between calls, so the Signal Desktop app can keep writing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::OpenFlags;
use sigstat_config::model::StoreConfig;
use sigstat_core::SigstatError;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cipher::{CipherParams, apply_cipher, validate_hex_key};
use crate::key::resolve_key;

/// Convert a tokio-rusqlite error into [`SigstatError::StoreAccess`].
pub(crate) fn map_tr_err(context: &str, e: tokio_rusqlite::Error<rusqlite::Error>) -> SigstatError {
    SigstatError::store_access(context, e)
}

/// Handle on a Signal Desktop data directory.
///
/// Holds paths and cipher parameters, never a connection. Clones share one
/// access gate, so at most one connection per store is open at a time.
#[derive(Debug, Clone)]
pub struct SignalStore {
    store_dir: PathBuf,
    db_path: PathBuf,
    cipher: CipherParams,
    access: Arc<Mutex<()>>,
}

impl SignalStore {
    /// Handle on `store_dir` using the given cipher parameters.
    pub fn new(store_dir: impl Into<PathBuf>, cipher: CipherParams) -> Self {
        let store_dir = store_dir.into();
        let db_path = store_dir.join("sql").join("db.sqlite");
        Self {
            store_dir,
            db_path,
            cipher,
            access: Arc::new(Mutex::new(())),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.store_path(), CipherParams::from(&config.cipher))
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    pub fn attachments_dir(&self) -> PathBuf {
        self.store_dir.join("attachments.noindex")
    }

    /// Run `op` against a freshly keyed read-only connection.
    ///
    /// The key is resolved on every call. The connection is closed whether
    /// `op` succeeds or not; a failed close is logged and otherwise ignored.
    pub async fn with_connection<F, R>(&self, context: &'static str, op: F) -> Result<R, SigstatError>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<R, rusqlite::Error> + Send + 'static,
        R: Send + 'static,
    {
        let _guard = self.access.lock().await;
        let key = resolve_key(&self.store_dir)?;
        validate_hex_key(&key)?;

        let conn = tokio_rusqlite::Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .await
        .map_err(|e| SigstatError::store_access("open database", e))?;
        debug!(path = %self.db_path.display(), context, "connected to store");

        let cipher = self.cipher.clone();
        let result = conn
            .call(move |conn| -> Result<R, rusqlite::Error> {
                apply_cipher(conn, &key, &cipher)?;
                op(conn)
            })
            .await;

        if let Err(e) = conn.close().await {
            warn!(error = %e, "failed to close store connection");
        }

        result.map_err(|e| map_tr_err(context, e))
    }
}
