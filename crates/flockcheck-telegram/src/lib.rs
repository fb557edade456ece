// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for flockcheck.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide:
//! long polling for messages and inline-keyboard callbacks, photo download,
//! and delivery of text, menu and photo effects.

pub mod handler;
pub mod keyboard;
pub mod media;

use async_trait::async_trait;
use flockcheck_config::model::TelegramConfig;
use flockcheck_core::{
    AdapterType, ChannelAdapter, ChatTarget, EffectKind, FlockError, HealthStatus, InboundEvent,
    OutboundEffect, PluginAdapter,
};
use teloxide::RequestError;
use teloxide::dispatching::UpdateHandler;
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Updates buffered between the dispatcher task and `receive()`.
const INBOUND_QUEUE: usize = 100;

/// Telegram transport for flockcheck conversations.
///
/// Only private chats are served. The dispatcher task turns updates into
/// [`InboundEvent`]s and pushes them onto a bounded queue that `receive()`
/// drains.
pub struct TelegramChannel {
    bot: Bot,
    events_tx: mpsc::Sender<InboundEvent>,
    events_rx: Mutex<mpsc::Receiver<InboundEvent>>,
    dispatcher: Option<JoinHandle<()>>,
}

impl TelegramChannel {
    /// Fails with a configuration error when no usable token is set.
    pub fn new(config: &TelegramConfig) -> Result<Self, FlockError> {
        let token = match config.bot_token.as_deref().map(str::trim) {
            None => {
                return Err(FlockError::Config(
                    "telegram.bot_token is not set; `serve` needs a Bot API token".into(),
                ));
            }
            Some("") => {
                return Err(FlockError::Config("telegram.bot_token is empty".into()));
            }
            Some(token) => token,
        };

        let (events_tx, events_rx) = mpsc::channel(INBOUND_QUEUE);
        Ok(Self {
            bot: Bot::new(token),
            events_tx,
            events_rx: Mutex::new(events_rx),
            dispatcher: None,
        })
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

/// Routes messages and button presses to their handlers.
fn schema() -> UpdateHandler<RequestError> {
    dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback))
}

async fn forward(events: &mpsc::Sender<InboundEvent>, event: InboundEvent) {
    if events.send(event).await.is_err() {
        warn!("event queue closed, update dropped");
    }
}

async fn on_message(
    bot: Bot,
    msg: Message,
    events: mpsc::Sender<InboundEvent>,
) -> ResponseResult<()> {
    if !handler::is_dm(&msg) {
        debug!(chat_id = msg.chat.id.0, "ignoring message outside a private chat");
        return Ok(());
    }

    match handler::to_inbound_event(&bot, &msg).await {
        Ok(Some(event)) => forward(&events, event).await,
        Ok(None) => debug!(msg_id = msg.id.0, "message carries nothing to handle"),
        Err(e) => error!(error = %e, msg_id = msg.id.0, "could not read message"),
    }
    Ok(())
}

async fn on_callback(
    bot: Bot,
    query: CallbackQuery,
    events: mpsc::Sender<InboundEvent>,
) -> ResponseResult<()> {
    // Stops the spinner on the pressed button.
    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
        warn!(error = %e, "answer_callback_query failed");
    }

    match handler::callback_event(&query) {
        Some(event) => forward(&events, event).await,
        None => debug!(data = ?query.data, "ignoring callback"),
    }
    Ok(())
}

fn send_error(e: RequestError) -> FlockError {
    FlockError::Channel {
        message: format!("Telegram send failed: {e}"),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    /// Calls `getMe`; an error means the token was refused or the API is unreachable.
    async fn health_check(&self) -> Result<HealthStatus, FlockError> {
        Ok(match self.bot.get_me().await {
            Ok(me) => {
                debug!(bot_id = me.user.id.0, "bot identity confirmed");
                HealthStatus::Healthy
            }
            Err(e) => HealthStatus::Unhealthy(format!("getMe failed: {e}")),
        })
    }

    async fn shutdown(&self) -> Result<(), FlockError> {
        if let Some(dispatcher) = &self.dispatcher {
            dispatcher.abort();
            info!("Telegram polling stopped");
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), FlockError> {
        if self.dispatcher.is_some() {
            return Ok(());
        }

        let bot = self.bot.clone();
        let events = self.events_tx.clone();
        self.dispatcher = Some(tokio::spawn(async move {
            Dispatcher::builder(bot, schema())
                .dependencies(dptree::deps![events])
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        }));

        info!("Telegram long polling started");
        Ok(())
    }

    async fn send(&self, effect: OutboundEffect) -> Result<(), FlockError> {
        let chat_id = parse_chat_id(&effect.chat)?;

        let delivered = match effect.kind {
            EffectKind::Text(text) => self.bot.send_message(chat_id, text).await,
            EffectKind::Menu { prompt, items } => {
                let markup = keyboard::inline_keyboard(&items);
                self.bot.send_message(chat_id, prompt).reply_markup(markup).await
            }
            EffectKind::Photo { data, caption } => {
                let mut request = self.bot.send_photo(chat_id, InputFile::memory(data));
                if let Some(caption) = caption {
                    request = request.caption(caption);
                }
                request.await
            }
        }
        .map_err(send_error)?;

        debug!(chat_id = chat_id.0, msg_id = delivered.id.0, "effect delivered");
        Ok(())
    }

    async fn receive(&self) -> Result<InboundEvent, FlockError> {
        self.events_rx
            .lock()
            .await
            .recv()
            .await
            .ok_or_else(|| FlockError::Channel {
                message: "Telegram event queue closed".into(),
                source: None,
            })
    }
}

/// Parses a chat target into a Telegram chat id.
fn parse_chat_id(chat: &ChatTarget) -> Result<ChatId, FlockError> {
    chat.0
        .parse::<i64>()
        .map(ChatId)
        .map_err(|e| FlockError::Channel {
            message: format!("invalid chat_id {:?}: {e}", chat.0),
            source: None,
        })
}
