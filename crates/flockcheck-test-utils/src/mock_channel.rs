// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`ChannelAdapter`] for driving the agent loop in tests.

use std::sync::Mutex as StdMutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify, mpsc};

use flockcheck_core::{
    AdapterType, ChannelAdapter, FlockError, HealthStatus, InboundEvent, OutboundEffect,
    PluginAdapter,
};

/// Chat transport backed by an unbounded queue.
///
/// Tests push events with [`inject`](Self::inject) and read back whatever the
/// agent sent. Once [`close`](Self::close) is called, `receive` hands out the
/// events still queued and then fails, which ends the agent loop.
pub struct MockChannel {
    inbox_tx: StdMutex<Option<mpsc::UnboundedSender<InboundEvent>>>,
    inbox_rx: Mutex<mpsc::UnboundedReceiver<InboundEvent>>,
    outbox: Mutex<Vec<OutboundEffect>>,
    delivered: Notify,
}

impl MockChannel {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            inbox_tx: StdMutex::new(Some(tx)),
            inbox_rx: Mutex::new(rx),
            outbox: Mutex::new(Vec::new()),
            delivered: Notify::new(),
        }
    }

    /// Queues an event. Events injected after `close` are discarded.
    pub async fn inject(&self, event: InboundEvent) {
        let guard = self.inbox_tx.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(tx) = guard.as_ref() {
            let _ = tx.send(event);
        }
    }

    pub fn close(&self) {
        self.inbox_tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
    }

    /// Snapshot of every effect sent so far, oldest first.
    pub async fn sent(&self) -> Vec<OutboundEffect> {
        self.outbox.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.outbox.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.outbox.lock().await.clear();
    }

    /// Returns the sent effects once there are at least `count`, or whatever
    /// arrived before `timeout`.
    pub async fn wait_for_sent(&self, count: usize, timeout: Duration) -> Vec<OutboundEffect> {
        let enough = async {
            loop {
                let delivered = self.delivered.notified();
                if self.sent_count().await >= count {
                    break;
                }
                delivered.await;
            }
        };
        let _ = tokio::time::timeout(timeout, enough).await;
        self.sent().await
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, FlockError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FlockError> {
        self.close();
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn connect(&mut self) -> Result<(), FlockError> {
        Ok(())
    }

    async fn send(&self, effect: OutboundEffect) -> Result<(), FlockError> {
        self.outbox.lock().await.push(effect);
        self.delivered.notify_waiters();
        Ok(())
    }

    async fn receive(&self) -> Result<InboundEvent, FlockError> {
        self.inbox_rx
            .lock()
            .await
            .recv()
            .await
            .ok_or_else(|| FlockError::Channel {
                message: "mock channel closed".into(),
                source: None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flockcheck_core::{ChatTarget, InboundKind, UserId};

    fn event(text: &str) -> InboundEvent {
        InboundEvent {
            user: UserId::from("test-user"),
            chat: ChatTarget("chat-1".into()),
            kind: InboundKind::Text(text.to_string()),
        }
    }

    #[tokio::test]
    async fn receive_returns_injected_events_in_order() {
        let channel = MockChannel::new();
        channel.inject(event("one")).await;
        channel.inject(event("two")).await;

        assert_eq!(channel.receive().await.unwrap(), event("one"));
        assert_eq!(channel.receive().await.unwrap(), event("two"));
    }

    #[tokio::test]
    async fn send_captures_effects() {
        let channel = MockChannel::new();
        let chat = ChatTarget("chat-1".into());
        channel
            .send(OutboundEffect::text(&chat, "hello"))
            .await
            .unwrap();

        let sent = channel.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].headline(), Some("hello"));
        channel.clear_sent().await;
        assert_eq!(channel.sent_count().await, 0);
    }

    #[tokio::test]
    async fn close_fails_receive_after_queue_drains() {
        let channel = MockChannel::new();
        channel.inject(event("last")).await;
        channel.close();

        assert!(channel.receive().await.is_ok());
        let err = channel.receive().await.unwrap_err();
        assert!(err.to_string().contains("closed"));
    }

    #[tokio::test]
    async fn connect_succeeds() {
        let mut channel = MockChannel::new();
        channel.connect().await.unwrap();
        assert_eq!(channel.adapter_type(), AdapterType::Channel);
    }
}
