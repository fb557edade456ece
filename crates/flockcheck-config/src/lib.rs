// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loading and validation of `flockcheck.toml`.
//!
//! Files are layered from `/etc`, the user config directory and the working
//! directory, then `FLOCKCHECK_*` variables override them. Failures come back
//! as a list of [`ConfigError`] diagnostics ready for [`render_errors`].
//!
//! # Example
//!
//! ```no_run
//! use flockcheck_config::load_and_validate;
//!
//! let config = match load_and_validate() {
//!     Ok(config) => config,
//!     Err(errors) => {
//!         flockcheck_config::render_errors(&errors);
//!         std::process::exit(1);
//!     }
//! };
//! println!("database: {}", config.storage.database_path);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::FlockcheckConfig;

/// Validates a loaded config, or maps the figment error against `sources`.
///
/// `sources` is only evaluated on failure, since re-reading files is needed
/// just for pointing at the offending key.
fn finish(
    loaded: Result<FlockcheckConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<FlockcheckConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Loads the layered configuration (files and `FLOCKCHECK_*` env) and validates it.
pub fn load_and_validate() -> Result<FlockcheckConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Like [`load_and_validate`], with `path` in place of the standard file locations.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<FlockcheckConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        std::fs::read_to_string(path)
            .map(|content| vec![(path.display().to_string(), content)])
            .unwrap_or_default()
    })
}

/// Parses and validates a TOML document. Environment overrides do not apply.
pub fn load_and_validate_str(toml_content: &str) -> Result<FlockcheckConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    if let Ok(content) = std::fs::read_to_string(loader::LOCAL_CONFIG) {
        let path = std::env::current_dir()
            .map(|d| d.join(loader::LOCAL_CONFIG).display().to_string())
            .unwrap_or_else(|_| loader::LOCAL_CONFIG.to_string());
        sources.push((path, content));
    }

    let user_path = loader::user_config_path();
    if let Ok(content) = std::fs::read_to_string(&user_path) {
        sources.push((user_path.display().to_string(), content));
    }

    if let Ok(content) = std::fs::read_to_string(loader::SYSTEM_CONFIG) {
        sources.push((loader::SYSTEM_CONFIG.to_string(), content));
    }

    sources
}
