// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for sigstat.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Top-level sigstat configuration.
///
/// Loaded from TOML files, environment variables, and command-line flags.
/// Every section is optional and defaults to values that work against a
/// standard Signal Desktop installation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SigstatConfig {
    /// Location and decryption of the Signal Desktop store.
    #[serde(default)]
    pub store: StoreConfig,

    /// Export destination and format.
    #[serde(default)]
    pub export: ExportConfig,

    /// Identity of the local user.
    #[serde(default)]
    pub user: UserConfig,

    /// Refresh cache policy.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Dashboard server settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// What to do with a message row whose payload cannot be normalized.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MalformedPolicy {
    /// Log a warning and drop the row.
    #[default]
    Skip,
    /// Fail the whole fetch.
    Abort,
}

/// Signal Desktop store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Signal Desktop data directory (holds `config.json`, `sql/db.sqlite`,
    /// and `attachments.noindex/`).
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Include disappearing messages (rows with `expires_at` set).
    #[serde(default)]
    pub include_expiring: bool,

    /// Policy for rows with a malformed JSON payload.
    #[serde(default)]
    pub on_malformed: MalformedPolicy,

    /// SQLCipher parameters. Must match the Signal Desktop release that
    /// wrote the database.
    #[serde(default)]
    pub cipher: CipherConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            include_expiring: false,
            on_malformed: MalformedPolicy::default(),
            cipher: CipherConfig::default(),
        }
    }
}

impl StoreConfig {
    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.store_dir)
    }

    /// Path of the encrypted database file.
    pub fn database_path(&self) -> PathBuf {
        self.store_path().join("sql").join("db.sqlite")
    }

    /// Directory holding attachment files.
    pub fn attachments_dir(&self) -> PathBuf {
        self.store_path().join("attachments.noindex")
    }
}

fn default_store_dir() -> String {
    dirs::config_dir()
        .map(|p| p.join("Signal"))
        .unwrap_or_else(|| PathBuf::from("Signal"))
        .to_string_lossy()
        .into_owned()
}

/// SQLCipher settings applied after the key pragma.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CipherConfig {
    /// `PRAGMA cipher_page_size`.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// `PRAGMA kdf_iter`.
    #[serde(default = "default_kdf_iter")]
    pub kdf_iter: u32,

    /// `PRAGMA cipher_hmac_algorithm`.
    #[serde(default = "default_hmac_algorithm")]
    pub hmac_algorithm: String,

    /// `PRAGMA cipher_kdf_algorithm`.
    #[serde(default = "default_kdf_algorithm")]
    pub kdf_algorithm: String,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            kdf_iter: default_kdf_iter(),
            hmac_algorithm: default_hmac_algorithm(),
            kdf_algorithm: default_kdf_algorithm(),
        }
    }
}

fn default_page_size() -> u32 {
    1024
}

fn default_kdf_iter() -> u32 {
    64000
}

fn default_hmac_algorithm() -> String {
    "HMAC_SHA1".to_string()
}

fn default_kdf_algorithm() -> String {
    "PBKDF2_HMAC_SHA1".to_string()
}

/// Output format of the `export` command.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    /// One `messages.csv` per conversation.
    #[default]
    Csv,
    /// One `messages.json` (array of records) per conversation.
    Json,
    /// A single SQL-text dump of the raw tables.
    Sql,
}

/// Export configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Directory receiving exported files.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default)]
    pub format: ExportFormat,

    /// Copy attachment files next to the exported messages.
    #[serde(default)]
    pub attachments: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            format: ExportFormat::default(),
            attachments: false,
        }
    }
}

impl ExportConfig {
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }
}

fn default_output_dir() -> String {
    "export".to_string()
}

/// Local user identity.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    /// The local user's phone number. Empty strings are treated as unset.
    #[serde(default)]
    pub own_number: Option<String>,
}

/// Refresh cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Maximum age in seconds of the cached message table.
    #[serde(default = "default_staleness_secs")]
    pub staleness_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            staleness_secs: default_staleness_secs(),
        }
    }
}

impl CacheConfig {
    pub fn staleness(&self) -> Duration {
        Duration::from_secs(self.staleness_secs)
    }
}

fn default_staleness_secs() -> u64 {
    60
}

/// Dashboard server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    /// Address to bind the dashboard to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to bind the dashboard to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Silence (in hours) that separates two conversations when working
    /// out who started them.
    #[serde(default = "default_conversation_gap_hours")]
    pub conversation_gap_hours: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            conversation_gap_hours: default_conversation_gap_hours(),
        }
    }
}

impl DashboardConfig {
    /// The conversation gap as a duration. Callers must validate first.
    pub fn conversation_gap(&self) -> Duration {
        Duration::from_secs_f64(self.conversation_gap_hours * 3600.0)
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8050
}

fn default_conversation_gap_hours() -> f64 {
    1.5
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
