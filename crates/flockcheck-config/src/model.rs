// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed configuration sections.
//!
//! Every section denies unknown fields so a misspelled key fails at startup
//! instead of being silently ignored.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root of `flockcheck.toml`. Every section may be omitted.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FlockcheckConfig {
    /// Bot identity and logging.
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Record store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Attachment (photo) storage settings.
    #[serde(default)]
    pub attachments: AttachmentConfig,

    /// `[session]` section.
    #[serde(default)]
    pub session: SessionConfig,
}

/// `[bot]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Name reported in logs.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Default tracing level for flockcheck crates; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_bot_name() -> String {
    "flockcheck".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `[telegram]` section.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Bot API token from BotFather. Required by `serve`.
    #[serde(default)]
    pub bot_token: Option<String>,
}

/// `[storage]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Open the database in write-ahead journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

/// `name` under the per-user data directory, or relative to the working
/// directory when the platform has none.
fn data_path(name: &str) -> String {
    let path = match dirs::data_dir() {
        Some(base) => base.join("flockcheck").join(name),
        None => std::path::PathBuf::from(name),
    };
    path.to_string_lossy().into_owned()
}

fn default_database_path() -> String {
    data_path("poultry_data.db")
}

fn default_wal_mode() -> bool {
    true
}

/// `[attachments]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AttachmentConfig {
    /// Directory where uploaded photos are written.
    #[serde(default = "default_attachment_dir")]
    pub directory: String,

    /// File extension for stored photos.
    #[serde(default = "default_attachment_extension")]
    pub extension: String,
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            directory: default_attachment_dir(),
            extension: default_attachment_extension(),
        }
    }
}

fn default_attachment_dir() -> String {
    data_path("images")
}

fn default_attachment_extension() -> String {
    "jpg".to_string()
}

/// `[session]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Seconds of inactivity after which an in-memory session is discarded.
    /// `None` keeps sessions until saved or cancelled.
    #[serde(default)]
    pub idle_timeout_secs: Option<u64>,

    /// Depth of each user's inbound event queue in the agent loop.
    #[serde(default = "default_lane_capacity")]
    pub lane_capacity: usize,

    /// Seconds a user's lane may sit with an empty queue before it is stopped.
    /// The next event from that user starts a new lane.
    #[serde(default = "default_lane_idle_secs")]
    pub lane_idle_secs: u64,

    /// Seconds to wait for in-flight events on shutdown.
    #[serde(default = "default_drain_timeout_secs")]
    pub drain_timeout_secs: u64,
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }

    pub fn lane_idle(&self) -> Duration {
        Duration::from_secs(self.lane_idle_secs)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: None,
            lane_capacity: default_lane_capacity(),
            lane_idle_secs: default_lane_idle_secs(),
            drain_timeout_secs: default_drain_timeout_secs(),
        }
    }
}

fn default_lane_capacity() -> usize {
    32
}

fn default_lane_idle_secs() -> u64 {
    300
}

fn default_drain_timeout_secs() -> u64 {
    10
}
