// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for sigstat.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable and command-line overrides,
//! per-key sanitizers, and miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use sigstat_config::{load_and_validate, ConfigOverrides};
//!
//! let config = load_and_validate(None, &ConfigOverrides::default()).expect("config errors");
//! println!("Signal store: {}", config.store.store_dir);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{ConfigOverrides, load_config, load_config_from_path, load_config_from_str};
pub use model::SigstatConfig;

/// Load, sanitize, and validate configuration.
///
/// 1. Builds the Figment (explicit file or XDG hierarchy, then env vars)
/// 2. Applies command-line overrides
/// 3. On success: sanitizes then validates
/// 4. On Figment error: converts to miette diagnostics with typo suggestions
pub fn load_and_validate(
    explicit: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<SigstatConfig, Vec<ConfigError>> {
    if let Some(path) = explicit
        && !path.is_file()
    {
        return Err(vec![ConfigError::FileNotFound {
            path: path.display().to_string(),
        }]);
    }

    let figment = overrides.apply(loader::build_figment(explicit));
    match figment.extract::<SigstatConfig>() {
        Ok(config) => finish(config),
        Err(err) => {
            let sources = collect_toml_sources(explicit);
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from a TOML string, then sanitize and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<SigstatConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => finish(config),
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

fn finish(mut config: SigstatConfig) -> Result<SigstatConfig, Vec<ConfigError>> {
    validation::sanitize_config(&mut config);
    validation::validate_config(&config)?;
    Ok(config)
}

/// Read the TOML files that may have contributed values, for span lookup.
fn collect_toml_sources(explicit: Option<&Path>) -> Vec<(String, String)> {
    let candidates = match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => {
            let mut paths = vec![loader::system_config_path().to_path_buf()];
            if let Some(config_dir) = dirs::config_dir() {
                paths.push(config_dir.join("sigstat").join(loader::CONFIG_FILE_NAME));
            }
            if let Ok(cwd) = std::env::current_dir() {
                paths.push(cwd.join(loader::CONFIG_FILE_NAME));
            }
            paths
        }
    };

    candidates
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            Some((path.display().to_string(), content))
        })
        .collect()
}
