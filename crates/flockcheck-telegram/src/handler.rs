// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update routing and conversion into [`InboundEvent`]s.
//!
//! Only private chats are served. Text messages become commands or plain
//! text, photos become attachment events, and inline-keyboard callbacks
//! become button presses.

use std::str::FromStr;

use flockcheck_core::{
    Action, ChatTarget, Command, FlockError, InboundEvent, InboundKind, UserId,
};
use teloxide::prelude::*;
use teloxide::types::ChatKind;
use tracing::debug;

use crate::media;

/// Checks whether the message is from a private (DM) chat.
///
/// Group, supergroup, and channel messages return `false`.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// The sending user, or `None` for messages without a sender.
pub fn sender(msg: &Message) -> Option<UserId> {
    msg.from.as_ref().map(|u| UserId(u.id.0.to_string()))
}

/// Maps message text to a command if it is one, otherwise to plain text.
pub fn text_kind(text: &str) -> InboundKind {
    match Command::parse(text) {
        Some(command) => InboundKind::Command(command),
        None => InboundKind::Text(text.to_string()),
    }
}

/// Converts a message into an inbound event.
///
/// Photos are downloaded here. Returns `None` for messages without a sender
/// and for unsupported message types (stickers, documents, locations, etc.).
pub async fn to_inbound_event(
    bot: &Bot,
    msg: &Message,
) -> Result<Option<InboundEvent>, FlockError> {
    let Some(user) = sender(msg) else {
        return Ok(None);
    };

    let kind = if let Some(text) = msg.text() {
        text_kind(text)
    } else if let Some(photos) = msg.photo() {
        let (token, data) = media::download_largest_photo(bot, photos).await?;
        InboundKind::Attachment { token, data }
    } else {
        debug!(msg_id = msg.id.0, "ignoring unsupported message type");
        return Ok(None);
    };

    Ok(Some(InboundEvent {
        user,
        chat: ChatTarget(msg.chat.id.0.to_string()),
        kind,
    }))
}

/// Converts an inline-keyboard callback into a button event.
///
/// Returns `None` for callbacks without data, with data that is not a known
/// action, or attached to a non-private chat.
pub fn callback_event(query: &CallbackQuery) -> Option<InboundEvent> {
    let data = query.data.as_deref()?;
    let action = match Action::from_str(data) {
        Ok(action) => action,
        Err(e) => {
            debug!(error = %e, "ignoring unknown callback data");
            return None;
        }
    };

    let chat = match query.message.as_ref().map(|m| m.chat()) {
        Some(chat) if !chat.is_private() => {
            debug!(chat_id = chat.id.0, "ignoring callback from non-private chat");
            return None;
        }
        Some(chat) => chat.id.0,
        // Private chat id equals the user id.
        None => query.from.id.0 as i64,
    };

    Some(InboundEvent {
        user: UserId(query.from.id.0.to_string()),
        chat: ChatTarget(chat.to_string()),
        kind: InboundKind::Button(action),
    })
}
