// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `flockcheck check` command implementation.
//!
//! Opens the database (running migrations), ensures the attachment directory
//! exists and reports the health of each adapter.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use flockcheck_config::model::{AttachmentConfig, FlockcheckConfig, StorageConfig, TelegramConfig};
use flockcheck_core::{FlockError, HealthStatus, PluginAdapter, RecordStore};
use flockcheck_storage::{FsAttachmentStore, SqliteRecordStore};
use flockcheck_telegram::TelegramChannel;

/// Status of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }

    fn from_health(name: &str, health: HealthStatus, start: Instant) -> Self {
        match health {
            HealthStatus::Healthy => Self::new(name, CheckStatus::Pass, "healthy", start),
            HealthStatus::Degraded(reason) => Self::new(name, CheckStatus::Warn, reason, start),
            HealthStatus::Unhealthy(reason) => Self::new(name, CheckStatus::Fail, reason, start),
        }
    }
}

/// Runs the `flockcheck check` command. Fails if any check failed.
pub async fn run_check(config: &FlockcheckConfig, plain: bool) -> Result<(), FlockError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let start = Instant::now();

    let results = vec![
        CheckResult::new("Configuration", CheckStatus::Pass, "valid", start),
        check_database(&config.storage).await,
        check_attachments(&config.attachments).await,
        check_telegram(&config.telegram).await,
    ];

    println!();
    println!("  flockcheck check");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", format_line(result, use_color));
    }
    println!();

    let failed = results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count();
    let warned = results
        .iter()
        .filter(|r| r.status == CheckStatus::Warn)
        .count();

    if failed + warned == 0 {
        println!("  All checks passed.");
    } else {
        let issues = failed + warned;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    }
    println!();

    if failed > 0 {
        return Err(FlockError::Internal(format!("{failed} check(s) failed")));
    }
    Ok(())
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red(), result.message.red()),
        };
        format!(
            "    {symbol} {:<20} {message} ({duration_ms}ms)",
            result.name
        )
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

/// Opens the database, applying migrations, and runs the store's health check.
async fn check_database(config: &StorageConfig) -> CheckResult {
    let start = Instant::now();
    let store = SqliteRecordStore::new(config.clone());

    if let Err(e) = store.initialize().await {
        return CheckResult::new("Database", CheckStatus::Fail, e.to_string(), start);
    }
    let result = match store.health_check().await {
        Ok(health) => CheckResult::from_health("Database", health, start),
        Err(e) => CheckResult::new("Database", CheckStatus::Fail, e.to_string(), start),
    };
    if let Err(e) = store.close().await {
        return CheckResult::new("Database", CheckStatus::Fail, e.to_string(), start);
    }
    result
}

/// Creates the attachment directory if needed and runs the store's health check.
async fn check_attachments(config: &AttachmentConfig) -> CheckResult {
    let start = Instant::now();

    if let Err(e) = tokio::fs::create_dir_all(&config.directory).await {
        return CheckResult::new(
            "Attachments",
            CheckStatus::Fail,
            format!("cannot create {}: {e}", config.directory),
            start,
        );
    }
    let store = FsAttachmentStore::new(config.clone());
    match store.health_check().await {
        Ok(health) => CheckResult::from_health("Attachments", health, start),
        Err(e) => CheckResult::new("Attachments", CheckStatus::Fail, e.to_string(), start),
    }
}

/// Checks that a bot token is configured and accepted by the Bot API.
async fn check_telegram(config: &TelegramConfig) -> CheckResult {
    let start = Instant::now();

    if config.bot_token.is_none() {
        return CheckResult::new(
            "Telegram",
            CheckStatus::Warn,
            "telegram.bot_token not set (required for serve)",
            start,
        );
    }
    let channel = match TelegramChannel::new(config) {
        Ok(channel) => channel,
        Err(e) => return CheckResult::new("Telegram", CheckStatus::Fail, e.to_string(), start),
    };
    match channel.health_check().await {
        // Unreachable may be a network issue rather than a bad token.
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new("Telegram", CheckStatus::Warn, reason, start)
        }
        Ok(health) => CheckResult::from_health("Telegram", health, start),
        Err(e) => CheckResult::new("Telegram", CheckStatus::Warn, e.to_string(), start),
    }
}
