// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for flockcheck.
//!
//! This crate provides the trait definitions, error type, and domain types
//! shared by the storage, agent, and channel crates.

pub mod error;
pub mod traits;
pub mod types;

pub use error::FlockError;
pub use types::{
    Action, AdapterType, AttachmentRef, ChatTarget, Command, EffectKind, FieldId, FieldStatus,
    FieldValues, HealthStatus, InboundEvent, InboundKind, MenuItem, OutboundEffect, Record,
    RecordId, UserId,
};

pub use traits::{AttachmentStore, ChannelAdapter, PluginAdapter, RecordStore};
