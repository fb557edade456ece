// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session controller: a per-user state machine that turns inbound events
//! into session mutations, store calls and outbound effects.
//!
//! Every event for a user is handled while holding that user's slot lock, so
//! a user's events never interleave. Store and attachment calls happen under
//! the lock; nothing else does.

use std::sync::Arc;
use std::time::Duration;

use flockcheck_config::model::SessionConfig;
use flockcheck_core::{
    Action, AttachmentRef, AttachmentStore, ChatTarget, Command, FieldId, FieldStatus, FlockError,
    InboundEvent, InboundKind, MenuItem, OutboundEffect, RecordId, RecordStore, UserId,
};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::fields;
use crate::messages::{self, buttons};
use crate::session::{Session, SessionState};
use crate::session_map::{SessionMap, UserSlot};

/// Session lifetime policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Discard an in-memory session idle for longer than this. `None` keeps
    /// sessions until save or cancel.
    pub idle_timeout: Option<Duration>,
}

impl SessionPolicy {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            idle_timeout: config.idle_timeout(),
        }
    }
}

/// Outbound effects collected while handling one event.
struct Reply<'a> {
    chat: &'a ChatTarget,
    effects: Vec<OutboundEffect>,
}

impl<'a> Reply<'a> {
    fn new(chat: &'a ChatTarget) -> Self {
        Self {
            chat,
            effects: Vec::new(),
        }
    }

    fn text(&mut self, text: impl Into<String>) {
        self.effects.push(OutboundEffect::text(self.chat, text));
    }

    fn menu(&mut self, prompt: impl Into<String>, items: Vec<MenuItem>) {
        self.effects
            .push(OutboundEffect::menu(self.chat, prompt, items));
    }

    fn photo(&mut self, data: Vec<u8>, caption: String) {
        self.effects
            .push(OutboundEffect::photo(self.chat, data, Some(caption)));
    }

    fn field_menu(&mut self, session: Option<&Session>) {
        let mut items: Vec<MenuItem> = FieldId::ALL
            .into_iter()
            .map(|field| {
                let filled = session.is_some_and(|s| s.values.is_filled(field));
                MenuItem {
                    label: field.label().to_string(),
                    action: Action::SelectField(field),
                    status: Some(if filled {
                        FieldStatus::Filled
                    } else {
                        FieldStatus::Missing
                    }),
                }
            })
            .collect();
        items.push(MenuItem::new(buttons::FINISH_REVIEW, Action::FinishReview));
        items.push(MenuItem::new(buttons::CANCEL, Action::Cancel));
        self.menu(messages::SELECT_FIELD, items);
    }

    fn resume_menu(&mut self, missing: &[FieldId]) {
        let mut prompt = messages::RESUME_PROMPT.to_string();
        if !missing.is_empty() {
            let labels: Vec<&str> = missing.iter().map(|f| f.label()).collect();
            prompt.push('\n');
            prompt.push_str(&messages::missing_fields(&labels));
        }
        self.menu(
            prompt,
            vec![
                MenuItem::new(buttons::RESUME, Action::Resume),
                MenuItem::new(buttons::NEW_CASE, Action::NewCase),
            ],
        );
    }

    fn new_case_menu(&mut self) {
        self.menu(
            messages::CONFIRM_NEW_CASE,
            vec![
                MenuItem::new(buttons::CONFIRM_NEW_CASE, Action::ConfirmNewCase),
                MenuItem::new(buttons::BACK, Action::Back),
            ],
        );
    }

    fn attachment_menu(&mut self) {
        self.menu(
            messages::ATTACHMENT_PROMPT,
            vec![MenuItem::new(buttons::SKIP, Action::Skip)],
        );
    }

    fn action_menu(&mut self) {
        self.menu(
            messages::NEXT_ACTION,
            vec![
                MenuItem::new(buttons::ADD_MORE, Action::AddMore),
                MenuItem::new(buttons::REVIEW, Action::Review),
                MenuItem::new(buttons::FINISH_REVIEW, Action::FinishReview),
            ],
        );
    }

    fn save_menu(&mut self) {
        self.menu(
            messages::CONFIRM_SAVE,
            vec![
                MenuItem::new(buttons::CONFIRM_SAVE, Action::ConfirmSave),
                MenuItem::new(buttons::CANCEL, Action::Cancel),
            ],
        );
    }

    fn cancel_menu(&mut self) {
        self.menu(
            messages::CONFIRM_CANCEL,
            vec![
                MenuItem::new(buttons::CONFIRM_CANCEL, Action::ConfirmCancel),
                MenuItem::new(buttons::ABORT_CANCEL, Action::AbortCancel),
            ],
        );
    }
}

/// Drives the data-collection flow for all users.
pub struct SessionController {
    store: Arc<dyn RecordStore>,
    attachments: Arc<dyn AttachmentStore>,
    sessions: SessionMap,
    policy: SessionPolicy,
}

impl SessionController {
    pub fn new(
        store: Arc<dyn RecordStore>,
        attachments: Arc<dyn AttachmentStore>,
        sessions: SessionMap,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            store,
            attachments,
            sessions,
            policy,
        }
    }

    /// The session map this controller owns.
    pub fn sessions(&self) -> &SessionMap {
        &self.sessions
    }

    /// Handles one inbound event and returns the effects to deliver, in order.
    pub async fn handle(&self, event: InboundEvent) -> Vec<OutboundEffect> {
        let InboundEvent { user, chat, kind } = event;
        let mut slot = self.sessions.lock(&user).await;
        let before = slot.state;
        let mut reply = Reply::new(&chat);

        let expired = self.expire_if_idle(&mut slot, &user).await;
        self.dispatch(&mut slot, &user, &mut reply, kind, expired)
            .await;

        slot.touched_at = Instant::now();
        if slot.state != before {
            debug!(user = %user, from = %before, to = %slot.state, "session transition");
        }
        drop(slot);

        if self.sessions.prune(&user) {
            debug!(user = %user, "empty session slot released");
        }
        reply.effects
    }

    /// Drops an idle session together with any photo it had not saved yet.
    async fn expire_if_idle(&self, slot: &mut UserSlot, user: &UserId) -> bool {
        let Some(timeout) = self.policy.idle_timeout else {
            return false;
        };
        let active = slot.session.is_some() || slot.state != SessionState::Terminated;
        let idle = slot.touched_at.elapsed();
        if !active || idle <= timeout {
            return false;
        }
        info!(
            user = %user,
            state = %slot.state,
            idle_secs = idle.as_secs(),
            "idle session expired"
        );
        let orphan = slot
            .session
            .take()
            .and_then(|session| session.unsaved_attachment().cloned());
        slot.state = SessionState::Terminated;
        if let Some(attachment) = orphan {
            self.discard_attachment(&attachment).await;
        }
        true
    }

    async fn dispatch(
        &self,
        slot: &mut UserSlot,
        user: &UserId,
        reply: &mut Reply<'_>,
        kind: InboundKind,
        expired: bool,
    ) {
        match kind {
            InboundKind::Command(Command::Start) => return self.enter(slot, user, reply).await,
            InboundKind::Command(Command::Cancel) => {
                // Quick cancel: the session stays in memory for the next /start.
                slot.state = SessionState::Terminated;
                reply.text(messages::CANCELLED);
                return;
            }
            _ => {}
        }
        if expired {
            reply.text(messages::SESSION_EXPIRED);
            return;
        }

        match slot.state {
            SessionState::Terminated => reply.text(messages::SEND_START),
            SessionState::AwaitingResumeChoice => {
                self.on_resume_choice(slot, user, reply, kind).await
            }
            SessionState::ConfirmingNewCase => {
                self.on_confirming_new_case(slot, user, reply, kind).await
            }
            SessionState::SelectingField => {
                self.on_selecting_field(slot, reply, kind).await
            }
            SessionState::EnteringValue { field } => {
                self.on_entering_value(slot, user, reply, field, kind)
            }
            SessionState::AwaitingAttachment => {
                self.on_awaiting_attachment(slot, user, reply, kind).await
            }
            SessionState::ActionMenu => self.on_action_menu(slot, user, reply, kind).await,
            SessionState::ConfirmingCancel => {
                self.on_confirming_cancel(slot, user, reply, kind).await
            }
        }
    }

    // --- Entry and resume ---

    async fn enter(&self, slot: &mut UserSlot, user: &UserId, reply: &mut Reply<'_>) {
        if slot.session.is_some() {
            slot.state = SessionState::SelectingField;
            reply.field_menu(slot.session.as_ref());
            return;
        }

        match self.store.latest_record_for_user(user).await {
            Ok(Some(record)) if !record.is_complete() => {
                debug!(user = %user, record_id = %record.id, "partial record found");
                slot.state = SessionState::AwaitingResumeChoice;
                reply.resume_menu(&record.values.missing());
            }
            Ok(_) => self.start_fresh(slot, reply),
            Err(e) => {
                error!(user = %user, error = %e, "failed to look up latest record");
                reply.text(messages::LOAD_FAILED);
            }
        }
    }

    fn start_fresh(&self, slot: &mut UserSlot, reply: &mut Reply<'_>) {
        slot.session = Some(Session::new());
        slot.state = SessionState::SelectingField;
        reply.field_menu(slot.session.as_ref());
    }

    async fn on_resume_choice(
        &self,
        slot: &mut UserSlot,
        user: &UserId,
        reply: &mut Reply<'_>,
        kind: InboundKind,
    ) {
        match kind {
            InboundKind::Button(Action::Resume) => {
                match self.store.latest_record_for_user(user).await {
                    Ok(Some(record)) if !record.is_complete() => {
                        info!(user = %user, record_id = %record.id, "resuming partial record");
                        slot.session = Some(Session::resumed(&record));
                        slot.state = SessionState::SelectingField;
                        reply.text(messages::RESUMED);
                        reply.field_menu(slot.session.as_ref());
                    }
                    Ok(_) => {
                        warn!(user = %user, "partial record disappeared before resume");
                        reply.text(messages::NOTHING_TO_RESUME);
                        self.start_fresh(slot, reply);
                    }
                    Err(e) => {
                        error!(user = %user, error = %e, "failed to load record for resume");
                        reply.text(messages::LOAD_FAILED);
                    }
                }
            }
            InboundKind::Button(Action::NewCase) => {
                slot.state = SessionState::ConfirmingNewCase;
                reply.new_case_menu();
            }
            other => self.unexpected(slot, user, reply, &other),
        }
    }

    async fn on_confirming_new_case(
        &self,
        slot: &mut UserSlot,
        user: &UserId,
        reply: &mut Reply<'_>,
        kind: InboundKind,
    ) {
        match kind {
            InboundKind::Button(Action::ConfirmNewCase) => {
                match self.store.delete_latest_for_user(user).await {
                    Ok(deleted) => {
                        if let Some(record) = deleted {
                            info!(user = %user, record_id = %record.id, "discarded partial record for new case");
                            if let Some(attachment) = &record.attachment {
                                self.discard_attachment(attachment).await;
                            }
                        }
                        reply.text(messages::NEW_CASE_STARTED);
                        self.start_fresh(slot, reply);
                    }
                    Err(e) => {
                        error!(user = %user, error = %e, "failed to delete record for new case");
                        reply.text(messages::DELETE_FAILED);
                    }
                }
            }
            InboundKind::Button(Action::Back) => {
                slot.state = SessionState::Terminated;
                self.enter(slot, user, reply).await;
            }
            other => self.unexpected(slot, user, reply, &other),
        }
    }

    // --- Field selection and entry ---

    async fn on_selecting_field(&self, slot: &mut UserSlot, reply: &mut Reply<'_>, kind: InboundKind) {
        match kind {
            InboundKind::Button(Action::SelectField(field)) => begin_entry(slot, reply, field),
            InboundKind::Button(Action::FinishReview) => {
                if self.review(slot, reply).await {
                    slot.state = SessionState::ActionMenu;
                    reply.save_menu();
                }
            }
            InboundKind::Button(Action::Review) => {
                self.review(slot, reply).await;
                reply.field_menu(slot.session.as_ref());
            }
            InboundKind::Button(Action::Cancel) => {
                slot.state = SessionState::ConfirmingCancel;
                reply.cancel_menu();
            }
            InboundKind::Attachment { .. } => {
                reply.text(messages::NO_FIELD_FOR_IMAGE);
                reply.field_menu(slot.session.as_ref());
            }
            _ => reply.field_menu(slot.session.as_ref()),
        }
    }

    fn on_entering_value(
        &self,
        slot: &mut UserSlot,
        user: &UserId,
        reply: &mut Reply<'_>,
        field: FieldId,
        kind: InboundKind,
    ) {
        let raw = match kind {
            InboundKind::Text(raw) => raw,
            other => return self.unexpected(slot, user, reply, &other),
        };
        match fields::validate(field, &raw) {
            Ok(value) => {
                session_mut(slot).values.set(field, value);
                debug!(user = %user, field = %field, "value accepted");
                if field.accepts_attachment() {
                    slot.state = SessionState::AwaitingAttachment;
                    reply.attachment_menu();
                } else {
                    slot.state = SessionState::ActionMenu;
                    reply.action_menu();
                }
            }
            Err(invalid) => {
                debug!(user = %user, field = %field, "value rejected");
                reply.text(invalid.reason);
            }
        }
    }

    async fn on_awaiting_attachment(
        &self,
        slot: &mut UserSlot,
        user: &UserId,
        reply: &mut Reply<'_>,
        kind: InboundKind,
    ) {
        match kind {
            InboundKind::Attachment { token, data } => {
                match self.attachments.store(user, &token, &data).await {
                    Ok(reference) => {
                        let session = session_mut(slot);
                        let superseded = session.unsaved_attachment().cloned();
                        session.attachment = Some(reference.clone());
                        if let Some(old) = superseded.filter(|old| *old != reference) {
                            self.discard_attachment(&old).await;
                        }
                        slot.state = SessionState::ActionMenu;
                        reply.text(messages::IMAGE_SAVED);
                        reply.action_menu();
                    }
                    Err(e) => {
                        error!(user = %user, error = %e, "failed to store attachment");
                        reply.text(messages::IMAGE_FAILED);
                    }
                }
            }
            InboundKind::Button(Action::Skip) | InboundKind::Command(Command::Skip) => {
                slot.state = SessionState::ActionMenu;
                reply.action_menu();
            }
            _ => reply.text(messages::ATTACHMENT_EXPECTED),
        }
    }

    // --- Action menu, review and save ---

    async fn on_action_menu(
        &self,
        slot: &mut UserSlot,
        user: &UserId,
        reply: &mut Reply<'_>,
        kind: InboundKind,
    ) {
        match kind {
            InboundKind::Button(Action::AddMore) => {
                slot.state = SessionState::SelectingField;
                reply.field_menu(slot.session.as_ref());
            }
            // A field button from an earlier menu: same as add-more, then select.
            InboundKind::Button(Action::SelectField(field)) => begin_entry(slot, reply, field),
            InboundKind::Button(Action::Review) => {
                if self.review(slot, reply).await {
                    reply.action_menu();
                }
            }
            InboundKind::Button(Action::FinishReview) => {
                if self.review(slot, reply).await {
                    reply.save_menu();
                }
            }
            InboundKind::Button(Action::ConfirmSave) => self.save(slot, user, reply).await,
            InboundKind::Button(Action::Cancel) => {
                slot.state = SessionState::ConfirmingCancel;
                reply.cancel_menu();
            }
            other => self.unexpected(slot, user, reply, &other),
        }
    }

    /// Emits the listing of filled fields. Returns `false` if there is nothing to list.
    async fn review(&self, slot: &UserSlot, reply: &mut Reply<'_>) -> bool {
        let Some(session) = slot.session.as_ref().filter(|s| !s.is_empty()) else {
            reply.text(messages::NO_DATA);
            return false;
        };

        reply.text(messages::REVIEW_HEADER);
        for (field, value) in session.values.filled() {
            let entry = format!("{}\n{}", field.label(), value);
            match (&session.attachment, field.accepts_attachment()) {
                (Some(attachment), true) => self.show_attachment(reply, attachment, entry).await,
                _ => reply.text(entry),
            }
        }
        if let Some(attachment) = &session.attachment {
            if !session.values.is_filled(FieldId::SymptomNotes) {
                self.show_attachment(reply, attachment, messages::ATTACHMENT_CAPTION.to_string())
                    .await;
            }
        }
        true
    }

    async fn show_attachment(&self, reply: &mut Reply<'_>, attachment: &AttachmentRef, caption: String) {
        match self.attachments.open(attachment).await {
            Ok(data) => reply.photo(data, caption),
            Err(e) => {
                if e.is_not_found() {
                    debug!(path = %attachment, "attachment missing at review");
                } else {
                    warn!(path = %attachment, error = %e, "failed to read attachment");
                }
                reply.text(format!("{caption}\n{}", messages::IMAGE_NOT_FOUND));
            }
        }
    }

    async fn save(&self, slot: &mut UserSlot, user: &UserId, reply: &mut Reply<'_>) {
        let session = session_mut(slot).clone();
        match self.persist(user, &session).await {
            Ok(id) => {
                let complete = session.values.is_complete();
                info!(user = %user, record_id = %id, complete, "record saved");
                if let Some(old) = session
                    .persisted_attachment
                    .as_ref()
                    .filter(|old| session.attachment.as_ref() != Some(*old))
                {
                    self.discard_attachment(old).await;
                }
                if complete {
                    reply.text(messages::SAVED_COMPLETE);
                } else {
                    let labels: Vec<&str> =
                        session.values.missing().iter().map(|f| f.label()).collect();
                    reply.text(format!(
                        "{}\n{}",
                        messages::SAVED_PARTIAL,
                        messages::missing_fields(&labels)
                    ));
                }
                slot.session = None;
                slot.state = SessionState::Terminated;
            }
            Err(e) => {
                error!(user = %user, error = %e, "failed to save record");
                reply.text(messages::SAVE_FAILED);
            }
        }
    }

    /// Updates the linked record in place, or creates a new one.
    async fn persist(&self, user: &UserId, session: &Session) -> Result<RecordId, FlockError> {
        let attachment = session.attachment.as_ref();
        let Some(id) = session.record_id else {
            return self
                .store
                .create_record(user, &session.values, attachment)
                .await;
        };
        match self
            .store
            .update_record(id, &session.values, attachment)
            .await
        {
            Ok(()) => Ok(id),
            Err(e) if e.is_not_found() => {
                warn!(user = %user, record_id = %id, "resumed record no longer exists, saving as new");
                self.store
                    .create_record(user, &session.values, attachment)
                    .await
            }
            Err(e) => Err(e),
        }
    }

    // --- Cancel ---

    async fn on_confirming_cancel(
        &self,
        slot: &mut UserSlot,
        user: &UserId,
        reply: &mut Reply<'_>,
        kind: InboundKind,
    ) {
        match kind {
            InboundKind::Button(Action::ConfirmCancel) => {
                let deleted = match self.store.delete_latest_for_user(user).await {
                    Ok(deleted) => deleted,
                    Err(e) => {
                        error!(user = %user, error = %e, "failed to delete latest record on cancel");
                        reply.text(messages::DELETE_FAILED);
                        return;
                    }
                };

                let mut doomed: Vec<AttachmentRef> = Vec::new();
                if let Some(session) = slot.session.take() {
                    doomed.extend(session.unsaved_attachment().cloned());
                }
                if let Some(attachment) = deleted.as_ref().and_then(|r| r.attachment.clone()) {
                    if !doomed.contains(&attachment) {
                        doomed.push(attachment);
                    }
                }
                for attachment in &doomed {
                    self.discard_attachment(attachment).await;
                }

                info!(
                    user = %user,
                    deleted_record = deleted.as_ref().map(|r| r.id.0),
                    "entry cancelled"
                );
                slot.state = SessionState::Terminated;
                reply.text(messages::ENTRY_CANCELLED);
            }
            InboundKind::Button(Action::AbortCancel) => {
                slot.state = SessionState::SelectingField;
                reply.field_menu(slot.session.as_ref());
            }
            other => self.unexpected(slot, user, reply, &other),
        }
    }

    // --- Helpers ---

    async fn discard_attachment(&self, attachment: &AttachmentRef) {
        if let Err(e) = self.attachments.delete(attachment).await {
            warn!(path = %attachment, error = %e, "failed to delete attachment");
        }
    }

    /// Input that the current state does not accept: re-show its prompt.
    fn unexpected(&self, slot: &UserSlot, user: &UserId, reply: &mut Reply<'_>, kind: &InboundKind) {
        debug!(user = %user, state = %slot.state, "input not accepted in this state");
        if matches!(kind, InboundKind::Attachment { .. }) {
            reply.text(messages::NO_FIELD_FOR_IMAGE);
        }
        match slot.state {
            SessionState::AwaitingResumeChoice => reply.resume_menu(&[]),
            SessionState::ConfirmingNewCase => reply.new_case_menu(),
            SessionState::SelectingField => reply.field_menu(slot.session.as_ref()),
            SessionState::EnteringValue { field } => {
                reply.text(messages::enter_value(field.label()))
            }
            SessionState::AwaitingAttachment => reply.attachment_menu(),
            SessionState::ActionMenu => reply.action_menu(),
            SessionState::ConfirmingCancel => reply.cancel_menu(),
            SessionState::Terminated => reply.text(messages::SEND_START),
        }
    }
}

fn begin_entry(slot: &mut UserSlot, reply: &mut Reply<'_>, field: FieldId) {
    slot.state = SessionState::EnteringValue { field };
    reply.text(messages::enter_value(field.label()));
}

fn session_mut(slot: &mut UserSlot) -> &mut Session {
    slot.session.get_or_insert_with(Session::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flockcheck_config::model::{AttachmentConfig, StorageConfig};
    use flockcheck_core::{EffectKind, FieldValues};
    use flockcheck_storage::{FsAttachmentStore, SqliteRecordStore};
    use tempfile::TempDir;
    use tracing_test::traced_test;

    async fn controller() -> (SessionController, Arc<SqliteRecordStore>, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteRecordStore::new(StorageConfig {
            database_path: dir.path().join("t.db").to_string_lossy().into_owned(),
            wal_mode: true,
        }));
        store.initialize().await.unwrap();
        let attachments = Arc::new(FsAttachmentStore::new(AttachmentConfig {
            directory: dir.path().join("img").to_string_lossy().into_owned(),
            extension: "jpg".into(),
        }));
        let controller = SessionController::new(
            store.clone(),
            attachments,
            SessionMap::new(),
            SessionPolicy::default(),
        );
        (controller, store, dir)
    }

    fn event(kind: InboundKind) -> InboundEvent {
        InboundEvent {
            user: UserId::from("u"),
            chat: ChatTarget("c".into()),
            kind,
        }
    }

    #[test]
    fn field_menu_lists_fields_then_finish_and_cancel() {
        let chat = ChatTarget("c".into());
        let mut reply = Reply::new(&chat);
        let mut session = Session::new();
        session.values.set(FieldId::Temperature, "41");
        reply.field_menu(Some(&session));

        let EffectKind::Menu { prompt, items } = &reply.effects[0].kind else {
            panic!("expected a menu");
        };
        assert_eq!(prompt, messages::SELECT_FIELD);
        assert_eq!(items.len(), 6);
        assert_eq!(items[1].status, Some(FieldStatus::Filled));
        assert_eq!(items[0].status, Some(FieldStatus::Missing));
        assert_eq!(items[4].action, Action::FinishReview);
        assert_eq!(items[5].action, Action::Cancel);
    }

    #[tokio::test]
    async fn effects_are_addressed_to_the_event_chat() {
        let (controller, _store, _dir) = controller().await;
        let effects = controller
            .handle(event(InboundKind::Command(Command::Start)))
            .await;
        assert!(effects.iter().all(|e| e.chat == ChatTarget("c".into())));
    }

    #[tokio::test]
    #[traced_test]
    async fn save_is_logged_with_record_id() {
        let (controller, _store, _dir) = controller().await;
        controller
            .handle(event(InboundKind::Command(Command::Start)))
            .await;
        controller
            .handle(event(InboundKind::Button(Action::SelectField(FieldId::Weight))))
            .await;
        controller.handle(event(InboundKind::Text("2".into()))).await;
        controller
            .handle(event(InboundKind::Button(Action::ConfirmSave)))
            .await;

        assert!(logs_contain("session transition"));
        assert!(logs_contain("record saved"));
        assert!(logs_contain("record_id=1"));
    }

    #[tokio::test]
    #[traced_test]
    async fn vanished_resumed_record_is_saved_as_new() {
        let (controller, store, _dir) = controller().await;
        let user = UserId::from("u");
        let values: FieldValues = [(FieldId::Weight, "1".to_string())].into_iter().collect();
        let id = store.create_record(&user, &values, None).await.unwrap();

        controller
            .handle(event(InboundKind::Command(Command::Start)))
            .await;
        controller
            .handle(event(InboundKind::Button(Action::Resume)))
            .await;
        store.delete_latest_for_user(&user).await.unwrap();

        controller
            .handle(event(InboundKind::Button(Action::FinishReview)))
            .await;
        let effects = controller
            .handle(event(InboundKind::Button(Action::ConfirmSave)))
            .await;
        assert!(matches!(
            &effects[0].kind,
            EffectKind::Text(t) if t.starts_with(messages::SAVED_PARTIAL)
        ));

        let latest = store.latest_record_for_user(&user).await.unwrap().unwrap();
        assert_ne!(latest.id, id);
        assert_eq!(latest.values, values);
        assert!(logs_contain("resumed record no longer exists"));
    }
}
