// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with fuzzy match suggestions.
//!
//! Each figment error becomes a [`ConfigError`] that miette can render with
//! the offending TOML line highlighted and, for unknown keys, the closest
//! valid key (Jaro-Winkler similarity).

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use std::path::{Path, PathBuf};

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a key to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key that no section declares.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(sigstat::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a sigstat setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong type.
    #[error("invalid type for `{key}`: {detail}")]
    #[diagnostic(code(sigstat::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    /// A value that parsed but is not one of the accepted variants.
    #[error("invalid value for `{key}`: {detail}")]
    #[diagnostic(code(sigstat::config::invalid_value))]
    InvalidValue { key: String, detail: String },

    /// A required key with no default.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(sigstat::config::missing_key),
        help("add `{key} = <value>` to sigstat.toml")
    )]
    MissingKey { key: String },

    /// The file given with `--config` does not exist.
    #[error("configuration file `{path}` not found")]
    #[diagnostic(code(sigstat::config::file_not_found))]
    FileNotFound { path: String },

    /// A semantic constraint failed after deserialization.
    #[error("validation error: {message}")]
    #[diagnostic(code(sigstat::config::validation))]
    Validation { message: String },

    /// Anything figment reports that has no dedicated variant.
    #[error("configuration error: {0}")]
    #[diagnostic(code(sigstat::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert every error carried by a `figment::Error` into a [`ConfigError`].
///
/// `toml_sources` holds `(path, content)` pairs used to attach source spans.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let key = error.path.join(".");
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let suggestion = suggest_key(field, expected);
                    let (span, src) = locate_key(&error, field, toml_sources);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        suggestion,
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: field.clone().into_owned(),
                },
                Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                    key,
                    detail: format!("found {actual}"),
                    expected: expected.to_string(),
                },
                Kind::UnknownVariant(found, variants) => ConfigError::InvalidValue {
                    key,
                    detail: format!("`{found}` is not one of: {}", variants.join(", ")),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// Find the span of `field` inside the file the error came from.
///
/// Files are matched on their canonical paths. When the origin is unknown or
/// matches nothing, the only source read, or the single source declaring the
/// key, is used instead.
fn locate_key(
    error: &figment::error::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(canonical(path)),
            _ => None,
        });

    let section = section_path(&error.path, field);
    let declaring: Vec<(&(String, String), usize)> = toml_sources
        .iter()
        .filter_map(|source| find_key_offset(&source.1, section, field).map(|at| (source, at)))
        .collect();

    let by_origin = origin.and_then(|origin| {
        declaring
            .iter()
            .find(|((path, _), _)| canonical(Path::new(path)) == origin)
            .copied()
    });
    let found = by_origin.or_else(|| match declaring.as_slice() {
        [single] => Some(*single),
        _ => None,
    });

    match found {
        Some(((path, content), offset)) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(path, content.clone())),
        ),
        None => (None, None),
    }
}

/// The table holding `field`. figment appends the unknown key itself to the
/// error path.
pub fn section_path<'a>(path: &'a [String], field: &str) -> &'a [String] {
    match path.split_last() {
        Some((last, section)) if last == field => section,
        _ => path,
    }
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Byte offset of `field` at the start of a line, searched after the
/// `[section]` header named by `path` (or from the top when `path` is empty).
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = if path.is_empty() {
        0
    } else {
        let header = format!("[{}]", path.join("."));
        content.find(&header)? + header.len()
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix(field)
            && rest.trim_start().starts_with('=')
        {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len();
    }
    None
}

/// Best valid key above the similarity threshold, if any.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render diagnostics to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_key() {
        let valid = &["store_dir", "include_expiring", "on_malformed", "cipher"];
        assert_eq!(suggest_key("stor_dir", valid), Some("store_dir".to_string()));
        assert_eq!(
            suggest_key("include_expring", valid),
            Some("include_expiring".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_key() {
        let valid = &["store_dir", "include_expiring"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn finds_key_inside_section() {
        let content = "[export]\noutput_dir = \"x\"\n\n[store]\nstor_dir = \"/tmp\"\n";
        let path = vec!["store".to_string()];
        let offset = find_key_offset(content, &path, "stor_dir").unwrap();
        assert_eq!(&content[offset..offset + 8], "stor_dir");
    }

    #[test]
    fn finds_key_in_nested_section() {
        let content = "[store.cipher]\n  kdf_itr = 1\n";
        let path = vec!["store".to_string(), "cipher".to_string()];
        let offset = find_key_offset(content, &path, "kdf_itr").unwrap();
        assert_eq!(&content[offset..offset + 7], "kdf_itr");
    }

    #[test]
    fn unknown_key_is_dropped_from_section_path() {
        let path = vec!["dashboard".to_string(), "prot".to_string()];
        assert_eq!(section_path(&path, "prot"), ["dashboard".to_string()]);
        let content = "[dashboard]\nprot = 9000\n";
        let offset = find_key_offset(content, section_path(&path, "prot"), "prot").unwrap();
        assert_eq!(offset, "[dashboard]\n".len());

        let top = vec!["stray".to_string()];
        assert!(section_path(&top, "stray").is_empty());
    }

    #[test]
    fn missing_section_has_no_offset() {
        let content = "[store]\nstore_dir = \"/tmp\"\n";
        let path = vec!["dashboard".to_string()];
        assert!(find_key_offset(content, &path, "store_dir").is_none());
    }
}
