// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user conversation state and the in-progress working copy of a record.
//!
//! The state machine moves through:
//! Terminated -> (AwaitingResumeChoice -> ConfirmingNewCase ->) SelectingField
//! -> EnteringValue -> (AwaitingAttachment ->) ActionMenu -> Terminated.
//! ConfirmingCancel can be entered from SelectingField and ActionMenu.

use flockcheck_core::{AttachmentRef, FieldId, FieldValues, Record, RecordId};

/// States of the data-collection FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// A partial record exists; waiting for "resume" or "new case".
    AwaitingResumeChoice,
    /// "New case" was chosen; waiting for confirmation before deleting.
    ConfirmingNewCase,
    /// Showing the field menu.
    SelectingField,
    /// Waiting for a typed value for `field`.
    EnteringValue { field: FieldId },
    /// Symptom notes accepted; waiting for a photo or skip.
    AwaitingAttachment,
    /// Showing add-more / review / finish.
    ActionMenu,
    /// Cancel requested; waiting for confirmation before deleting.
    ConfirmingCancel,
    /// No traversal in progress. The next `/start` begins a new one.
    Terminated,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::AwaitingResumeChoice => write!(f, "awaiting_resume_choice"),
            SessionState::ConfirmingNewCase => write!(f, "confirming_new_case"),
            SessionState::SelectingField => write!(f, "selecting_field"),
            SessionState::EnteringValue { field } => write!(f, "entering_value({field})"),
            SessionState::AwaitingAttachment => write!(f, "awaiting_attachment"),
            SessionState::ActionMenu => write!(f, "action_menu"),
            SessionState::ConfirmingCancel => write!(f, "confirming_cancel"),
            SessionState::Terminated => write!(f, "terminated"),
        }
    }
}

/// The transient working copy of one record. Never persisted directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub values: FieldValues,
    pub attachment: Option<AttachmentRef>,
    /// Set iff the session was created by resuming a persisted record.
    pub record_id: Option<RecordId>,
    /// Attachment currently referenced by the linked record, if any.
    pub persisted_attachment: Option<AttachmentRef>,
}

impl Session {
    /// An empty session not linked to any record.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session that continues `record`; saving it updates the record in place.
    pub fn resumed(record: &Record) -> Self {
        Self {
            values: record.values.clone(),
            attachment: record.attachment.clone(),
            record_id: Some(record.id),
            persisted_attachment: record.attachment.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.attachment.is_none()
    }

    /// The current attachment if it is not yet referenced by any record.
    pub fn unsaved_attachment(&self) -> Option<&AttachmentRef> {
        self.attachment
            .as_ref()
            .filter(|a| self.persisted_attachment.as_ref() != Some(*a))
    }
}
