// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization sanitizing and validation.
//!
//! Sanitizing normalizes values per key (home expansion, empty strings to
//! unset). Validation then checks semantic constraints serde cannot express
//! and reports every failure at once.

use crate::diagnostic::ConfigError;
use crate::model::SigstatConfig;

/// Normalize user-supplied values in place.
///
/// - `store.store_dir`, `export.output_dir`: a leading `~` expands to the home directory.
/// - `user.own_number`: blank becomes unset, surrounding whitespace is trimmed.
/// - `logging.level`: lowercased.
pub fn sanitize_config(config: &mut SigstatConfig) {
    config.store.store_dir = expand_home(&config.store.store_dir);
    config.export.output_dir = expand_home(&config.export.output_dir);

    config.user.own_number = config
        .user
        .own_number
        .take()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    config.logging.level = config.logging.level.trim().to_ascii_lowercase();
}

fn expand_home(path: &str) -> String {
    let rest = if path == "~" {
        ""
    } else if let Some(rest) = path.strip_prefix("~/") {
        rest
    } else {
        return path.to_string();
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home.to_string_lossy().into_owned(),
        Some(home) => home.join(rest).to_string_lossy().into_owned(),
        None => path.to_string(),
    }
}

/// Validate a sanitized configuration.
///
/// Returns `Ok(())` if all validations pass, or every collected error.
pub fn validate_config(config: &SigstatConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.store.store_dir.trim().is_empty() {
        fail("store.store_dir must not be empty".to_string());
    }

    if config.export.output_dir.trim().is_empty() {
        fail("export.output_dir must not be empty".to_string());
    }

    let cipher = &config.store.cipher;
    if cipher.page_size < 512 || !cipher.page_size.is_power_of_two() {
        fail(format!(
            "store.cipher.page_size must be a power of two of at least 512, got {}",
            cipher.page_size
        ));
    }
    if cipher.kdf_iter == 0 {
        fail("store.cipher.kdf_iter must be greater than 0".to_string());
    }
    for (key, value) in [
        ("hmac_algorithm", &cipher.hmac_algorithm),
        ("kdf_algorithm", &cipher.kdf_algorithm),
    ] {
        // Interpolated into a pragma, so only identifier characters are allowed.
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            fail(format!(
                "store.cipher.{key} `{value}` must be a non-empty SQLCipher algorithm name"
            ));
        }
    }

    if config.cache.staleness_secs == 0 {
        fail("cache.staleness_secs must be greater than 0".to_string());
    }

    let addr = config.dashboard.bind_address.trim();
    if addr.is_empty() {
        fail("dashboard.bind_address must not be empty".to_string());
    } else {
        let is_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = addr
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        if !is_ip && !is_hostname {
            fail(format!(
                "dashboard.bind_address `{addr}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.dashboard.port == 0 {
        fail("dashboard.port must not be 0".to_string());
    }

    let gap = config.dashboard.conversation_gap_hours;
    if !gap.is_finite() || gap <= 0.0 {
        fail(format!(
            "dashboard.conversation_gap_hours must be a positive number, got {gap}"
        ));
    }

    const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
    if !LEVELS.contains(&config.logging.level.as_str()) {
        fail(format!(
            "logging.level `{}` must be one of: {}",
            config.logging.level,
            LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = SigstatConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_store_dir_fails_validation() {
        let mut config = SigstatConfig::default();
        config.store.store_dir = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "store.store_dir"));
    }

    #[test]
    fn zero_staleness_fails_validation() {
        let mut config = SigstatConfig::default();
        config.cache.staleness_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "staleness_secs"));
    }

    #[test]
    fn bad_cipher_values_fail_validation() {
        let mut config = SigstatConfig::default();
        config.store.cipher.page_size = 1000;
        config.store.cipher.kdf_iter = 0;
        config.store.cipher.hmac_algorithm = "HMAC_SHA1; DROP".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "page_size"));
        assert!(has_error(&errors, "kdf_iter"));
        assert!(has_error(&errors, "hmac_algorithm"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = SigstatConfig::default();
        config.dashboard.port = 0;
        config.dashboard.conversation_gap_hours = -1.0;
        config.logging.level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn blank_own_number_sanitizes_to_none() {
        let mut config = SigstatConfig::default();
        config.user.own_number = Some("   ".to_string());
        sanitize_config(&mut config);
        assert!(config.user.own_number.is_none());

        config.user.own_number = Some(" +15550001111 ".to_string());
        sanitize_config(&mut config);
        assert_eq!(config.user.own_number.as_deref(), Some("+15550001111"));
    }

    #[test]
    fn home_prefix_is_expanded() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let mut config = SigstatConfig::default();
        config.store.store_dir = "~/.config/Signal".to_string();
        config.export.output_dir = "./export".to_string();
        sanitize_config(&mut config);
        assert_eq!(
            config.store.store_dir,
            home.join(".config/Signal").to_string_lossy()
        );
        assert_eq!(config.export.output_dir, "./export");
    }

    #[test]
    fn log_level_is_lowercased() {
        let mut config = SigstatConfig::default();
        config.logging.level = "DEBUG".to_string();
        sanitize_config(&mut config);
        assert_eq!(config.logging.level, "debug");
        assert!(validate_config(&config).is_ok());
    }
}
