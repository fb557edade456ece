// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `flockcheck serve` command implementation.
//!
//! Opens the record store and attachment directory, connects the Telegram
//! channel, and runs the agent loop until SIGINT/SIGTERM.

use std::sync::Arc;

use flockcheck_agent::{AgentLoop, SessionController, SessionMap, SessionPolicy, shutdown};
use flockcheck_config::model::FlockcheckConfig;
use flockcheck_core::{ChannelAdapter, FlockError, RecordStore};
use flockcheck_storage::{FsAttachmentStore, SqliteRecordStore};
use flockcheck_telegram::TelegramChannel;
use tracing::info;

/// Runs the `flockcheck serve` command.
pub async fn run_serve(config: FlockcheckConfig) -> Result<(), FlockError> {
    init_tracing(&config.bot.log_level);

    info!(name = %config.bot.name, "starting flockcheck serve");

    // Fail on a missing token before touching storage.
    let mut channel = TelegramChannel::new(&config.telegram)?;

    let store = Arc::new(SqliteRecordStore::new(config.storage.clone()));
    store.initialize().await?;
    info!(path = %config.storage.database_path, "record store ready");

    let attachments = Arc::new(FsAttachmentStore::new(config.attachments.clone()));
    info!(directory = %config.attachments.directory, "attachment store ready");

    let policy = SessionPolicy::from_config(&config.session);
    match policy.idle_timeout {
        Some(timeout) => info!(idle_timeout_secs = timeout.as_secs(), "idle sessions expire"),
        None => info!("idle sessions never expire"),
    }
    let controller = Arc::new(SessionController::new(
        store.clone(),
        attachments,
        SessionMap::new(),
        policy,
    ));

    channel.connect().await?;

    let cancel = shutdown::install_signal_handler();

    let mut agent_loop = AgentLoop::new(Arc::new(channel), controller, store, &config.session);
    agent_loop.run(cancel).await?;

    info!("flockcheck serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("flockcheck={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
