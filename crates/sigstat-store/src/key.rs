// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database key lookup from the Signal Desktop `config.json`.

use std::path::Path;

use secrecy::SecretString;
use sigstat_core::SigstatError;
use tracing::debug;

/// File inside the store directory holding the database key.
pub const KEY_FILE_NAME: &str = "config.json";

/// Read the `key` field of `<store_dir>/config.json`.
///
/// The value is returned exactly as stored. Only a redacted form
/// (`0xabc...xyz`) is ever logged.
pub fn resolve_key(store_dir: &Path) -> Result<SecretString, SigstatError> {
    let path = store_dir.join(KEY_FILE_NAME);
    let content = std::fs::read_to_string(&path).map_err(|e| {
        SigstatError::Configuration(format!("cannot read {}: {e}", path.display()))
    })?;

    let document: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
        SigstatError::Configuration(format!("{} is not valid JSON: {e}", path.display()))
    })?;

    let key = document
        .get("key")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| {
            SigstatError::Configuration(format!(
                "{} has no string field `key`",
                path.display()
            ))
        })?;

    debug!(key = %redact_key(key), "database key resolved");
    Ok(SecretString::from(key.to_string()))
}

/// `0x` followed by the first and last three characters of the key.
pub fn redact_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 6 {
        return "0x...".to_string();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 3..].iter().collect();
    format!("0x{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn write_config(dir: &Path, content: &str) {
        std::fs::write(dir.join(KEY_FILE_NAME), content).unwrap();
    }

    #[test]
    fn returns_key_field_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"{"key": "00ff11ee22dd", "mediaPermissions": true}"#,
        );
        let key = resolve_key(dir.path()).unwrap();
        assert_eq!(key.expose_secret(), "00ff11ee22dd");
    }

    #[test]
    fn missing_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_key(dir.path()).unwrap_err();
        assert!(matches!(err, SigstatError::Configuration(_)));
    }

    #[test]
    fn missing_key_field_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), r#"{"mediaPermissions": true}"#);
        let err = resolve_key(dir.path()).unwrap_err();
        assert!(matches!(err, SigstatError::Configuration(ref m) if m.contains("`key`")));
    }

    #[test]
    fn non_string_key_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), r#"{"key": 1234}"#);
        assert!(matches!(
            resolve_key(dir.path()),
            Err(SigstatError::Configuration(_))
        ));
    }

    #[test]
    fn invalid_json_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "key = abc");
        assert!(matches!(
            resolve_key(dir.path()),
            Err(SigstatError::Configuration(_))
        ));
    }

    #[test]
    fn redaction_keeps_three_chars_each_side() {
        assert_eq!(redact_key("abcdef0123456789"), "0xabc...789");
        assert_eq!(redact_key("abc"), "0x...");
    }
}
