// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data-collection sessions for the flockcheck bot.
//!
//! The [`AgentLoop`] is the central coordinator that:
//! - Receives events from a channel adapter
//! - Routes each user's events, in arrival order, to a per-user lane
//! - Runs the [`SessionController`] state machine for each event
//! - Delivers the resulting effects back through the channel
//! - Handles graceful shutdown

pub mod controller;
pub mod fields;
pub mod messages;
pub mod session;
pub mod session_map;
pub mod shutdown;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use flockcheck_config::model::SessionConfig;
use flockcheck_core::{
    ChannelAdapter, FlockError, InboundEvent, OutboundEffect, RecordStore, UserId,
};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub use controller::{SessionController, SessionPolicy};
pub use session::{Session, SessionState};
pub use session_map::SessionMap;

/// Sending half of one user's queue.
struct Lane {
    tx: mpsc::Sender<InboundEvent>,
    last_event: Instant,
}

impl Lane {
    fn is_drained(&self) -> bool {
        self.tx.capacity() == self.tx.max_capacity()
    }
}

/// Feeds channel events into the controller with per-user ordering.
pub struct AgentLoop {
    channel: Arc<dyn ChannelAdapter>,
    controller: Arc<SessionController>,
    store: Arc<dyn RecordStore>,
    lane_capacity: usize,
    lane_idle: Duration,
    drain_timeout: Duration,
    lanes: HashMap<UserId, Lane>,
    tasks: JoinSet<()>,
}

impl AgentLoop {
    /// Creates a loop over a connected channel. `store` is closed when the loop stops.
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        controller: Arc<SessionController>,
        store: Arc<dyn RecordStore>,
        config: &SessionConfig,
    ) -> Self {
        info!(
            channel = channel.name(),
            lane_capacity = config.lane_capacity,
            lane_idle_secs = config.lane_idle_secs,
            "agent loop initialized"
        );
        Self {
            channel,
            controller,
            store,
            lane_capacity: config.lane_capacity.max(1),
            lane_idle: config.lane_idle().max(Duration::from_millis(1)),
            drain_timeout: config.drain_timeout(),
            lanes: HashMap::new(),
            tasks: JoinSet::new(),
        }
    }

    /// Overrides how long an empty lane is kept.
    pub fn with_lane_idle(mut self, lane_idle: Duration) -> Self {
        self.lane_idle = lane_idle.max(Duration::from_millis(1));
        self
    }

    /// Runs until the cancellation token fires or the channel closes.
    ///
    /// On exit, lanes finish their queued events (bounded by the drain
    /// timeout) and the record store is closed.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), FlockError> {
        info!("agent loop running");

        let mut sweep = tokio::time::interval(self.lane_idle);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                event = self.channel.receive() => {
                    match event {
                        Ok(event) => self.route(event),
                        Err(e) => {
                            error!(error = %e, "channel receive error");
                            if e.to_string().contains("closed") {
                                break;
                            }
                        }
                    }
                }
                _ = sweep.tick() => self.close_idle_lanes(),
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping agent loop");
                    break;
                }
            }
        }

        // Dropping the senders lets each lane finish its queue and exit.
        self.lanes.clear();
        shutdown::drain_lanes(&mut self.tasks, self.drain_timeout).await;

        if let Err(e) = self.channel.shutdown().await {
            warn!(error = %e, "channel shutdown failed");
        }
        self.store.close().await?;

        info!("agent loop stopped");
        Ok(())
    }

    fn reap_finished_tasks(&mut self) {
        while let Some(finished) = self.tasks.try_join_next() {
            if let Err(e) = finished {
                error!(error = %e, "lane task failed");
            }
        }
    }

    /// Drops the sender of every lane with an empty queue and no event for
    /// `lane_idle`. The lane task exits once it finishes the event in hand.
    fn close_idle_lanes(&mut self) {
        self.reap_finished_tasks();
        let lane_idle = self.lane_idle;
        let before = self.lanes.len();
        self.lanes
            .retain(|_, lane| !(lane.is_drained() && lane.last_event.elapsed() >= lane_idle));
        let closed = before - self.lanes.len();
        if closed > 0 {
            debug!(closed, open = self.lanes.len(), "idle lanes closed");
        }
    }

    /// Queues `event` on its user's lane, starting the lane if needed.
    fn route(&mut self, event: InboundEvent) {
        self.reap_finished_tasks();

        let user = event.user.clone();
        let tx = match self.lanes.get_mut(&user) {
            Some(lane) if !lane.tx.is_closed() => {
                lane.last_event = Instant::now();
                lane.tx.clone()
            }
            _ => self.spawn_lane(user.clone()),
        };

        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(user = %user, "lane full, dropping event");
                let channel = Arc::clone(&self.channel);
                let busy = OutboundEffect::text(&event.chat, messages::BUSY);
                self.tasks.spawn(async move {
                    if let Err(e) = channel.send(busy).await {
                        error!(user = %user, error = %e, "failed to deliver busy notice");
                    }
                });
            }
            Err(TrySendError::Closed(_)) => {
                warn!(user = %user, "lane closed, dropping event");
            }
        }
    }

    fn spawn_lane(&mut self, user: UserId) -> mpsc::Sender<InboundEvent> {
        let (tx, mut rx) = mpsc::channel::<InboundEvent>(self.lane_capacity);
        let controller = Arc::clone(&self.controller);
        let channel = Arc::clone(&self.channel);
        let lane_user = user.clone();

        self.tasks.spawn(async move {
            while let Some(event) = rx.recv().await {
                for effect in controller.handle(event).await {
                    if let Err(e) = channel.send(effect).await {
                        error!(user = %lane_user, error = %e, "failed to deliver effect");
                    }
                }
            }
            debug!(user = %lane_user, "lane closed");
        });

        debug!(user = %user, "lane started");
        self.lanes.insert(
            user,
            Lane {
                tx: tx.clone(),
                last_event: Instant::now(),
            },
        );
        tx
    }
}
