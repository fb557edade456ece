// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process signals and lane draining.
//!
//! SIGINT or SIGTERM cancels a [`CancellationToken`]. The agent loop stops
//! taking new events and gives each user lane a bounded time to finish.

use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Spawns a task that cancels the returned token on SIGINT or SIGTERM.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        let signal = wait_for_signal().await;
        info!(signal, "shutdown requested");
        trigger.cancel();
    });

    token
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            warn!(error = %e, "SIGTERM handler unavailable, only SIGINT stops the bot");
            let _ = tokio::signal::ctrl_c().await;
            return "SIGINT";
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "Ctrl+C"
}

/// Waits up to `timeout` for lane tasks to finish their queued events.
///
/// Lanes still running at the deadline are aborted. Returns the number of
/// lanes that were aborted.
pub async fn drain_lanes(lanes: &mut JoinSet<()>, timeout: Duration) -> usize {
    if lanes.is_empty() {
        return 0;
    }

    info!(lanes = lanes.len(), "draining user lanes");
    let finish_all = async { while lanes.join_next().await.is_some() {} };
    if tokio::time::timeout(timeout, finish_all).await.is_ok() {
        info!("user lanes drained");
        return 0;
    }

    let stuck = lanes.len();
    warn!(stuck, timeout_secs = timeout.as_secs(), "aborting lanes still busy at deadline");
    lanes.shutdown().await;
    stuck
}
