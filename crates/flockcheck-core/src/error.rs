// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for flockcheck.

use thiserror::Error;

/// The primary error type used across all flockcheck adapter traits and core operations.
///
/// User input that fails a field rule is not represented here; see
/// `flockcheck_agent::fields::Invalid`.
#[derive(Debug, Error)]
pub enum FlockError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Durable store errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A referenced record or attachment does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Attachment file I/O errors other than a missing file.
    #[error("attachment error: {message}")]
    Attachment {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Channel adapter errors (connection failure, delivery failure).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FlockError {
    /// Returns `true` for [`FlockError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, FlockError::NotFound { .. })
    }
}
