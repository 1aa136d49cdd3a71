// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLCipher keying and parameter pragmas.
//!
//! The parameters must match the Signal Desktop release that wrote the
//! database; a mismatch surfaces as "file is not a database" on the first
//! read, not when the pragmas are applied.

use rusqlite::Connection;
use secrecy::{ExposeSecret, SecretString};
use sigstat_config::model::CipherConfig;
use sigstat_core::SigstatError;

/// Cipher parameters applied after the key pragma.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherParams {
    pub page_size: u32,
    pub kdf_iter: u32,
    pub hmac_algorithm: String,
    pub kdf_algorithm: String,
}

impl Default for CipherParams {
    fn default() -> Self {
        Self::from(&CipherConfig::default())
    }
}

impl From<&CipherConfig> for CipherParams {
    fn from(config: &CipherConfig) -> Self {
        Self {
            page_size: config.page_size,
            kdf_iter: config.kdf_iter,
            hmac_algorithm: config.hmac_algorithm.clone(),
            kdf_algorithm: config.kdf_algorithm.clone(),
        }
    }
}

impl CipherParams {
    /// The statements that key and configure a connection, in order.
    fn pragma_sql(&self, hex_key: &str) -> String {
        format!(
            "PRAGMA key = \"x'{hex_key}'\";\n\
             PRAGMA cipher_page_size = {};\n\
             PRAGMA kdf_iter = {};\n\
             PRAGMA cipher_hmac_algorithm = {};\n\
             PRAGMA cipher_kdf_algorithm = {};",
            self.page_size, self.kdf_iter, self.hmac_algorithm, self.kdf_algorithm
        )
    }
}

/// Reject anything but hex digits before the key is interpolated into SQL.
pub fn validate_hex_key(key: &SecretString) -> Result<(), SigstatError> {
    let key = key.expose_secret();
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(SigstatError::Configuration(
            "database key must be a non-empty hex string".to_string(),
        ));
    }
    Ok(())
}

/// Key `conn` and apply the cipher parameters.
///
/// `key` must already have passed [`validate_hex_key`]; the algorithm names
/// are restricted to identifier characters by config validation.
pub fn apply_cipher(
    conn: &Connection,
    key: &SecretString,
    params: &CipherParams,
) -> rusqlite::Result<()> {
    conn.execute_batch(&params.pragma_sql(key.expose_secret()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c762e7160f38b4da56a784d9045190cfe";

    #[test]
    fn defaults_match_signal_desktop() {
        let params = CipherParams::default();
        assert_eq!(params.page_size, 1024);
        assert_eq!(params.kdf_iter, 64000);
        assert_eq!(params.hmac_algorithm, "HMAC_SHA1");
        assert_eq!(params.kdf_algorithm, "PBKDF2_HMAC_SHA1");
    }

    #[test]
    fn pragma_order_is_key_first() {
        let sql = CipherParams::default().pragma_sql("abcd");
        let lines: Vec<&str> = sql.lines().collect();
        assert_eq!(lines[0], "PRAGMA key = \"x'abcd'\";");
        assert_eq!(lines[1], "PRAGMA cipher_page_size = 1024;");
        assert_eq!(lines[2], "PRAGMA kdf_iter = 64000;");
        assert_eq!(lines[3], "PRAGMA cipher_hmac_algorithm = HMAC_SHA1;");
        assert_eq!(lines[4], "PRAGMA cipher_kdf_algorithm = PBKDF2_HMAC_SHA1;");
    }

    #[test]
    fn hex_key_validation() {
        assert!(validate_hex_key(&SecretString::from(KEY.to_string())).is_ok());
        assert!(validate_hex_key(&SecretString::from("".to_string())).is_err());
        assert!(validate_hex_key(&SecretString::from("abc'; --".to_string())).is_err());
    }

    #[test]
    fn encrypted_roundtrip_with_matching_params() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.sqlite");
        let key = SecretString::from(KEY.to_string());
        let params = CipherParams::default();

        let conn = Connection::open(&path).unwrap();
        apply_cipher(&conn, &key, &params).unwrap();
        conn.execute_batch("CREATE TABLE t (x INTEGER); INSERT INTO t VALUES (42);")
            .unwrap();
        drop(conn);

        let conn = Connection::open(&path).unwrap();
        apply_cipher(&conn, &key, &params).unwrap();
        let x: i64 = conn.query_row("SELECT x FROM t", [], |r| r.get(0)).unwrap();
        assert_eq!(x, 42);
    }

    #[test]
    fn wrong_key_fails_on_first_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.sqlite");
        let params = CipherParams::default();

        let conn = Connection::open(&path).unwrap();
        apply_cipher(&conn, &SecretString::from(KEY.to_string()), &params).unwrap();
        conn.execute_batch("CREATE TABLE t (x INTEGER);").unwrap();
        drop(conn);

        let wrong = SecretString::from("00".repeat(32));
        let conn = Connection::open(&path).unwrap();
        apply_cipher(&conn, &wrong, &params).unwrap();
        assert!(conn.query_row("SELECT count(*) FROM t", [], |r| r.get::<_, i64>(0)).is_err());
    }
}
