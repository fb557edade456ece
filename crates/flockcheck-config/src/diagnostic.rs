// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering of configuration failures as miette diagnostics.
//!
//! Figment reports deserialization failures as a chain of errors. Each one is
//! mapped to a [`ConfigError`]; unknown keys are pointed at in the TOML file
//! they came from and get a spelling suggestion when one is close enough.

#![allow(unused_assignments)] // generated by the miette Diagnostic derive

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a known key must exceed to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Everything that can be wrong with a flockcheck configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(flockcheck::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        /// Comma separated keys accepted in the same section.
        valid_keys: String,
        #[label("not a flockcheck setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(flockcheck::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(flockcheck::config::missing_key),
        help("set `{key}` in flockcheck.toml")
    )]
    MissingKey { key: String },

    /// A value that parsed but is out of range or inconsistent.
    #[error("validation error: {message}")]
    #[diagnostic(code(flockcheck::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(flockcheck::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    let mut help = String::new();
    if let Some(candidate) = suggestion {
        help.push_str(&format!("did you mean `{candidate}`? "));
    }
    help.push_str(&format!("Valid keys: {valid_keys}"));
    help
}

/// Maps every error in the figment chain to a [`ConfigError`].
///
/// `toml_sources` holds `(path, content)` pairs for the files that were
/// layered, used to attach a source span to unknown keys.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, expected) => {
                let (span, src) = locate_unknown_key(&error, field, toml_sources);
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion: suggest_key(field, &expected[..]),
                    valid_keys: expected.join(", "),
                    span,
                    src,
                }
            }
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: field.to_string(),
            },
            Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                key: error.path.join("."),
                detail: format!("found {actual}, expected {expected}"),
                expected: expected.clone(),
            },
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

fn locate_unknown_key(
    error: &figment::error::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|meta| meta.source.as_ref())
        .and_then(|source| source.file_path())
        .map(|path| path.display().to_string());

    // Strings loaded inline carry no file path; use the lone source if any.
    let matched = match origin {
        Some(path) => toml_sources.iter().find(|(candidate, _)| *candidate == path),
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    };

    matched
        .and_then(|(path, content)| {
            let offset = find_key_offset(content, &error.path, field)?;
            Some((
                Some(SourceSpan::new(offset.into(), field.len())),
                Some(NamedSource::new(path, content.clone())),
            ))
        })
        .unwrap_or((None, None))
}

/// Byte offset of `field` as a key inside the TOML section named by `path`.
///
/// Only the first path segment is used as the section header; keys at the top
/// level are searched from the start of the document.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let body_start = match path.first() {
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
        None => 0,
    };

    let mut line_start = body_start;
    for line in content[body_start..].split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let rest = &line[indent..];
        let is_key = rest
            .strip_prefix(field)
            .and_then(|after| after.chars().next())
            .is_some_and(|c| c == '=' || c == ' ' || c == '\t');
        if is_key {
            return Some(line_start + indent);
        }
        line_start += line.len();
    }
    None
}

/// Closest known key to `unknown`, if any scores above the threshold.
pub fn suggest_key<S: AsRef<str>>(unknown: &str, valid_keys: &[S]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key.as_ref()), key.as_ref()))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Writes each error to stderr with miette's graphical renderer.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut report = String::new();
        match handler.render_report(&mut report, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{report}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misspelled_storage_key_gets_suggestion() {
        let valid = ["database_path", "wal_mode"];
        assert_eq!(
            suggest_key("databse_path", &valid),
            Some("database_path".to_string())
        );
    }

    #[test]
    fn unrelated_key_gets_no_suggestion() {
        assert_eq!(suggest_key("zzzzzz", &["name", "log_level"]), None);
    }

    #[test]
    fn best_scoring_key_wins() {
        let valid = ["idle_timeout_secs", "lane_capacity"];
        assert_eq!(
            suggest_key("lane_capacty", &valid),
            Some("lane_capacity".to_string())
        );
    }

    #[test]
    fn key_offset_points_inside_section() {
        let content = "[bot]\nnaem = \"test\"\n";
        let path = vec!["bot".to_string()];
        let o = find_key_offset(content, &path, "naem").unwrap();
        assert_eq!(&content[o..o + 4], "naem");
    }

    #[test]
    fn key_offset_ignores_earlier_sections() {
        let content = "[storage]\nwal_mode = true\n[session]\n  wal_mode = 1\n";
        let path = vec!["session".to_string()];
        let o = find_key_offset(content, &path, "wal_mode").unwrap();
        assert!(o > content.find("[session]").unwrap());
        assert_eq!(&content[o..o + 8], "wal_mode");
    }

    #[test]
    fn key_prefix_is_not_a_match() {
        let content = "[storage]\nwal_mode_extra = true\n";
        let path = vec!["storage".to_string()];
        assert_eq!(find_key_offset(content, &path, "wal_mode"), None);
    }

    #[test]
    fn help_lists_valid_keys_without_suggestion() {
        assert_eq!(unknown_key_help(None, "a, b"), "Valid keys: a, b");
    }
}
