// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./flockcheck.toml` > `~/.config/flockcheck/flockcheck.toml`
//! > `/etc/flockcheck/flockcheck.toml` with environment variable overrides via
//! `FLOCKCHECK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::FlockcheckConfig;

pub(crate) const LOCAL_CONFIG: &str = "flockcheck.toml";
pub(crate) const SYSTEM_CONFIG: &str = "/etc/flockcheck/flockcheck.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/flockcheck/flockcheck.toml` (system-wide)
/// 3. `~/.config/flockcheck/flockcheck.toml` (user XDG config)
/// 4. `./flockcheck.toml` (local directory)
/// 5. `FLOCKCHECK_*` environment variables
pub fn load_config() -> Result<FlockcheckConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<FlockcheckConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FlockcheckConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FlockcheckConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FlockcheckConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(FlockcheckConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

pub(crate) fn user_config_path() -> std::path::PathBuf {
    dirs::config_dir()
        .map(|d| d.join("flockcheck").join(LOCAL_CONFIG))
        .unwrap_or_default()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `FLOCKCHECK_TELEGRAM_BOT_TOKEN` must map to `telegram.bot_token`,
/// not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("FLOCKCHECK_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: [&str; 5] = ["bot", "telegram", "storage", "attachments", "session"];
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
