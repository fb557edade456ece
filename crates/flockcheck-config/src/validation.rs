// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes.

use crate::diagnostic::ConfigError;
use crate::model::FlockcheckConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns all collected validation errors (does not fail fast).
pub fn validate_config(config: &FlockcheckConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.bot.log_level.as_str()) {
        fail(format!(
            "bot.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.bot.log_level
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.attachments.directory.trim().is_empty() {
        fail("attachments.directory must not be empty".to_string());
    }

    let ext = &config.attachments.extension;
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        fail(format!(
            "attachments.extension must be non-empty and alphanumeric, got `{ext}`"
        ));
    }

    if config.session.idle_timeout_secs == Some(0) {
        fail("session.idle_timeout_secs must be greater than 0 when set".to_string());
    }

    if config.session.lane_capacity == 0 {
        fail("session.lane_capacity must be at least 1".to_string());
    }

    if config.session.lane_idle_secs == 0 {
        fail("session.lane_idle_secs must be greater than 0".to_string());
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
        let config = FlockcheckConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = FlockcheckConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "database_path"));
    }

    #[test]
    fn bad_extension_fails_validation() {
        let mut config = FlockcheckConfig::default();
        config.attachments.extension = "../jpg".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "attachments.extension"));
    }

    #[test]
    fn zero_idle_timeout_fails_validation() {
        let mut config = FlockcheckConfig::default();
        config.session.idle_timeout_secs = Some(0);
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "idle_timeout_secs"));
    }

    #[test]
    fn zero_lane_idle_fails_validation() {
        let mut config = FlockcheckConfig::default();
        config.session.lane_idle_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "lane_idle_secs"));
    }

    #[test]
    fn errors_are_collected_not_fail_fast() {
        let mut config = FlockcheckConfig::default();
        config.bot.log_level = "loud".to_string();
        config.attachments.directory = String::new();
        config.session.lane_capacity = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
