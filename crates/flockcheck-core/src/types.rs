// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the flockcheck workspace.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Stable external identifier of the operator (e.g. a Telegram user id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

/// Store-assigned record identifier. Stable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where outbound effects for a conversation are delivered (a chat id for Telegram).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatTarget(pub String);

impl fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage reference of a stored attachment (a filesystem path).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentRef(pub String);

impl AttachmentRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttachmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
    Attachment,
}

// --- Fields ---

/// The fixed set of fields collected for one inspection record, in display order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    Weight,
    Temperature,
    MedicationNotes,
    SymptomNotes,
}

impl FieldId {
    /// All fields in display order.
    pub const ALL: [FieldId; 4] = [
        FieldId::Weight,
        FieldId::Temperature,
        FieldId::MedicationNotes,
        FieldId::SymptomNotes,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            FieldId::Weight => "Body Weight",
            FieldId::Temperature => "Body Temperature",
            FieldId::MedicationNotes => "Vaccination/Medication",
            FieldId::SymptomNotes => "Infection Symptoms",
        }
    }

    /// Column name in the `poultry_health` table.
    pub fn column(self) -> &'static str {
        match self {
            FieldId::Weight => "body_weight",
            FieldId::Temperature => "body_temperature",
            FieldId::MedicationNotes => "vaccination_medication",
            FieldId::SymptomNotes => "infection_symptoms",
        }
    }

    /// Whether a validated value for this field is followed by an optional attachment.
    pub fn accepts_attachment(self) -> bool {
        self == FieldId::SymptomNotes
    }
}

/// Entered values keyed by field. Absent key = missing value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValues(BTreeMap<FieldId, String>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: FieldId) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn set(&mut self, field: FieldId, value: impl Into<String>) {
        self.0.insert(field, value.into());
    }

    pub fn is_filled(&self, field: FieldId) -> bool {
        self.0.contains_key(&field)
    }

    /// Filled `(field, value)` pairs in display order.
    pub fn filled(&self) -> impl Iterator<Item = (FieldId, &str)> {
        self.0.iter().map(|(f, v)| (*f, v.as_str()))
    }

    /// Fields without a value, in display order.
    pub fn missing(&self) -> Vec<FieldId> {
        FieldId::ALL
            .into_iter()
            .filter(|f| !self.is_filled(*f))
            .collect()
    }

    /// Complete iff every field has a value.
    pub fn is_complete(&self) -> bool {
        FieldId::ALL.iter().all(|f| self.is_filled(*f))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(FieldId, String)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (FieldId, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A persisted inspection record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub user: UserId,
    pub values: FieldValues,
    pub attachment: Option<AttachmentRef>,
    /// ISO 8601 creation timestamp. Never mutated after insert.
    pub created_at: String,
}

impl Record {
    pub fn is_complete(&self) -> bool {
        self.values.is_complete()
    }
}

// --- Inbound events ---

/// A button the operator can press. Encoded as callback data by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    SelectField(FieldId),
    Resume,
    NewCase,
    ConfirmNewCase,
    Back,
    AddMore,
    Review,
    FinishReview,
    ConfirmSave,
    Cancel,
    ConfirmCancel,
    AbortCancel,
    Skip,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::SelectField(field) => write!(f, "field:{field}"),
            Action::Resume => f.write_str("resume"),
            Action::NewCase => f.write_str("new_case"),
            Action::ConfirmNewCase => f.write_str("confirm_new_case"),
            Action::Back => f.write_str("back"),
            Action::AddMore => f.write_str("add_more"),
            Action::Review => f.write_str("review"),
            Action::FinishReview => f.write_str("finish_review"),
            Action::ConfirmSave => f.write_str("confirm_save"),
            Action::Cancel => f.write_str("cancel"),
            Action::ConfirmCancel => f.write_str("confirm_cancel"),
            Action::AbortCancel => f.write_str("abort_cancel"),
            Action::Skip => f.write_str("skip"),
        }
    }
}

/// Callback data that does not name a known [`Action`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action `{0}`")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(field) = s.strip_prefix("field:") {
            return FieldId::from_str(field)
                .map(Action::SelectField)
                .map_err(|_| UnknownAction(s.to_string()));
        }
        let action = match s {
            "resume" => Action::Resume,
            "new_case" => Action::NewCase,
            "confirm_new_case" => Action::ConfirmNewCase,
            "back" => Action::Back,
            "add_more" => Action::AddMore,
            "review" => Action::Review,
            "finish_review" => Action::FinishReview,
            "confirm_save" => Action::ConfirmSave,
            "cancel" => Action::Cancel,
            "confirm_cancel" => Action::ConfirmCancel,
            "abort_cancel" => Action::AbortCancel,
            "skip" => Action::Skip,
            _ => return Err(UnknownAction(s.to_string())),
        };
        Ok(action)
    }
}

/// Slash commands understood by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Command {
    Start,
    Skip,
    Cancel,
}

impl Command {
    /// Parses `/start`, `/skip`, `/cancel`, tolerating a `@botname` suffix and trailing arguments.
    pub fn parse(text: &str) -> Option<Command> {
        let word = text.trim().strip_prefix('/')?.split_whitespace().next()?;
        let name = word.split('@').next().unwrap_or(word);
        Command::from_str(&name.to_ascii_lowercase()).ok()
    }
}

/// What the operator sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundKind {
    Text(String),
    Button(Action),
    /// Binary attachment plus the transport's opaque file token.
    Attachment { token: String, data: Vec<u8> },
    Command(Command),
}

/// An inbound event from the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub user: UserId,
    pub chat: ChatTarget,
    pub kind: InboundKind,
}

// --- Outbound effects ---

/// Whether a field in a selection menu already has a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    Filled,
    Missing,
}

/// One labeled action in a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub action: Action,
    pub status: Option<FieldStatus>,
}

impl MenuItem {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
            status: None,
        }
    }
}

/// Semantic description of what the transport should deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectKind {
    Text(String),
    Menu { prompt: String, items: Vec<MenuItem> },
    Photo { data: Vec<u8>, caption: Option<String> },
}

/// An outbound effect addressed to a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEffect {
    pub chat: ChatTarget,
    pub kind: EffectKind,
}

impl OutboundEffect {
    pub fn text(chat: &ChatTarget, text: impl Into<String>) -> Self {
        Self {
            chat: chat.clone(),
            kind: EffectKind::Text(text.into()),
        }
    }

    pub fn menu(chat: &ChatTarget, prompt: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            chat: chat.clone(),
            kind: EffectKind::Menu {
                prompt: prompt.into(),
                items,
            },
        }
    }

    pub fn photo(chat: &ChatTarget, data: Vec<u8>, caption: Option<String>) -> Self {
        Self {
            chat: chat.clone(),
            kind: EffectKind::Photo { data, caption },
        }
    }

    /// The text of a `Text` effect or the prompt of a `Menu`.
    pub fn headline(&self) -> Option<&str> {
        match &self.kind {
            EffectKind::Text(t) => Some(t),
            EffectKind::Menu { prompt, .. } => Some(prompt),
            EffectKind::Photo { caption, .. } => caption.as_deref(),
        }
    }
}
