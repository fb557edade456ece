// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for chat transports (Telegram, etc.).

use async_trait::async_trait;

use crate::error::FlockError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{InboundEvent, OutboundEffect};

/// Adapter for bidirectional chat transports.
///
/// The transport turns platform updates into [`InboundEvent`]s and renders
/// [`OutboundEffect`]s (text, menus, photos) in its own format.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), FlockError>;

    /// Delivers one outbound effect.
    async fn send(&self, effect: OutboundEffect) -> Result<(), FlockError>;

    /// Receives the next inbound event.
    async fn receive(&self) -> Result<InboundEvent, FlockError>;
}
