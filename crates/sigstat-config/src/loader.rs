// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./sigstat.toml` > `~/.config/sigstat/sigstat.toml` >
//! `/etc/sigstat/sigstat.toml`, with environment variable overrides via the
//! `SIGSTAT_` prefix and command-line overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::SigstatConfig;

/// Name of the configuration file looked up in each directory.
pub const CONFIG_FILE_NAME: &str = "sigstat.toml";

/// Sections whose keys may be set through `SIGSTAT_<SECTION>_<KEY>`.
///
/// Longest prefixes first so `store_cipher_` wins over `store_`.
const ENV_SECTIONS: &[(&str, &str)] = &[
    ("store_cipher_", "store.cipher."),
    ("store_", "store."),
    ("export_", "export."),
    ("user_", "user."),
    ("cache_", "cache."),
    ("dashboard_", "dashboard."),
    ("logging_", "logging."),
];

/// Values given on the command line. They override every other layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub store_dir: Option<String>,
    pub include_expiring: Option<bool>,
    pub output_dir: Option<String>,
    pub log_level: Option<String>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
}

impl ConfigOverrides {
    /// Merge the set values into `figment`.
    pub fn apply(&self, mut figment: Figment) -> Figment {
        if let Some(dir) = &self.store_dir {
            figment = figment.merge(("store.store_dir", dir));
        }
        if let Some(include) = self.include_expiring {
            figment = figment.merge(("store.include_expiring", include));
        }
        if let Some(dir) = &self.output_dir {
            figment = figment.merge(("export.output_dir", dir));
        }
        if let Some(level) = &self.log_level {
            figment = figment.merge(("logging.level", level));
        }
        if let Some(addr) = &self.bind_address {
            figment = figment.merge(("dashboard.bind_address", addr));
        }
        if let Some(port) = self.port {
            figment = figment.merge(("dashboard.port", port));
        }
        figment
    }
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/sigstat/sigstat.toml` (system-wide)
/// 3. `~/.config/sigstat/sigstat.toml` (user XDG config)
/// 4. `./sigstat.toml` (local directory)
/// 5. `SIGSTAT_*` environment variables
pub fn load_config() -> Result<SigstatConfig, figment::Error> {
    build_figment(None).extract()
}

/// Load configuration from a TOML string on top of the defaults only.
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<SigstatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SigstatConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SigstatConfig, figment::Error> {
    build_figment(Some(path)).extract()
}

/// Build the Figment used for config loading, before extraction.
///
/// With `explicit` set, only that file is read (plus env vars); otherwise the
/// XDG hierarchy is searched.
pub fn build_figment(explicit: Option<&Path>) -> Figment {
    let figment = Figment::new().merge(Serialized::defaults(SigstatConfig::default()));

    let figment = match explicit {
        Some(path) => figment.merge(Toml::file(path)),
        None => figment
            .merge(Toml::file(system_config_path()))
            .merge(Toml::file(
                dirs::config_dir()
                    .map(|d| d.join("sigstat").join(CONFIG_FILE_NAME))
                    .unwrap_or_default(),
            ))
            .merge(Toml::file(CONFIG_FILE_NAME)),
    };

    figment.merge(env_provider())
}

/// Path of the system-wide configuration file.
pub fn system_config_path() -> &'static Path {
    Path::new("/etc/sigstat/sigstat.toml")
}

/// Map a prefix-stripped env var name onto a dotted config key.
///
/// `store_cipher_kdf_iter` becomes `store.cipher.kdf_iter`, `store_store_dir`
/// becomes `store.store_dir`. Names outside the known sections pass through
/// unchanged and are rejected later by `deny_unknown_fields`.
pub fn env_key_to_path(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for (prefix, section) in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(prefix) {
            return format!("{section}{rest}");
        }
    }
    key
}

/// Environment provider using an explicit section map instead of
/// `Env::split("_")`, since key names themselves contain underscores.
fn env_provider() -> Env {
    Env::prefixed("SIGSTAT_").map(|key| env_key_to_path(key.as_str()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(env_key_to_path("store_store_dir"), "store.store_dir");
        assert_eq!(env_key_to_path("store_cipher_kdf_iter"), "store.cipher.kdf_iter");
        assert_eq!(env_key_to_path("export_output_dir"), "export.output_dir");
        assert_eq!(env_key_to_path("user_own_number"), "user.own_number");
        assert_eq!(env_key_to_path("cache_staleness_secs"), "cache.staleness_secs");
        assert_eq!(env_key_to_path("dashboard_port"), "dashboard.port");
        assert_eq!(env_key_to_path("logging_level"), "logging.level");
        assert_eq!(env_key_to_path("STORE_INCLUDE_EXPIRING"), "store.include_expiring");
        assert_eq!(env_key_to_path("bogus"), "bogus");
    }

    #[test]
    fn overrides_win_over_file_values() {
        let overrides = ConfigOverrides {
            store_dir: Some("/from/cli".into()),
            include_expiring: Some(true),
            port: Some(9000),
            ..Default::default()
        };
        let figment = Figment::new()
            .merge(Serialized::defaults(SigstatConfig::default()))
            .merge(Toml::string("[store]\nstore_dir = \"/from/file\"\n"));
        let config: SigstatConfig = overrides.apply(figment).extract().unwrap();
        assert_eq!(config.store.store_dir, "/from/cli");
        assert!(config.store.include_expiring);
        assert_eq!(config.dashboard.port, 9000);
    }

    #[test]
    fn empty_overrides_change_nothing() {
        let figment = Figment::new().merge(Serialized::defaults(SigstatConfig::default()));
        let config: SigstatConfig = ConfigOverrides::default().apply(figment).extract().unwrap();
        assert_eq!(config.export.output_dir, "export");
        assert_eq!(config.dashboard.port, 8050);
    }
}
