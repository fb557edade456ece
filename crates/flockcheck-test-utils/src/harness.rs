// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end conversation tests.
//!
//! `TestHarness` assembles a [`SessionController`] over a temp SQLite
//! database and a temp attachment directory. Helpers like `start()`,
//! `press()` and `text()` drive one event through the controller and return
//! the effects it produced.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use flockcheck_agent::{Session, SessionController, SessionMap, SessionPolicy, SessionState};
use flockcheck_config::model::{AttachmentConfig, StorageConfig};
use flockcheck_core::{
    Action, ChatTarget, Command, FlockError, InboundEvent, InboundKind,
    OutboundEffect, RecordStore, UserId,
};
use flockcheck_storage::{FsAttachmentStore, SqliteRecordStore};

use crate::flaky_store::FlakyRecordStore;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    idle_timeout: Option<Duration>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self { idle_timeout: None }
    }

    /// Expire sessions idle for longer than `timeout`.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Build the harness, creating the database and image directory.
    pub async fn build(self) -> Result<TestHarness, FlockError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| FlockError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");
        let image_dir = temp_dir.path().join("images");

        let sqlite = Arc::new(SqliteRecordStore::new(StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        }));
        sqlite.initialize().await?;
        let store = Arc::new(FlakyRecordStore::new(sqlite.clone()));

        let attachments = Arc::new(FsAttachmentStore::new(AttachmentConfig {
            directory: image_dir.to_string_lossy().into_owned(),
            extension: "jpg".to_string(),
        }));

        let controller = Arc::new(SessionController::new(
            store.clone(),
            attachments.clone(),
            SessionMap::new(),
            SessionPolicy {
                idle_timeout: self.idle_timeout,
            },
        ));

        Ok(TestHarness {
            controller,
            store,
            sqlite,
            attachments,
            image_dir,
            _temp_dir: temp_dir,
        })
    }
}

/// A controller wired to real storage in a temp directory.
pub struct TestHarness {
    /// The controller under test.
    pub controller: Arc<SessionController>,
    /// The store the controller writes through; can inject failures.
    pub store: Arc<FlakyRecordStore>,
    /// Direct access to the underlying SQLite store for assertions.
    pub sqlite: Arc<SqliteRecordStore>,
    /// The attachment store the controller writes through.
    pub attachments: Arc<FsAttachmentStore>,
    /// Directory where attachments are written.
    pub image_dir: PathBuf,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default options.
    pub async fn new() -> Result<Self, FlockError> {
        Self::builder().build().await
    }

    /// Drive one event from `user` (chat id = user id) through the controller.
    pub async fn send(&self, user: &str, kind: InboundKind) -> Vec<OutboundEffect> {
        self.controller
            .handle(InboundEvent {
                user: UserId::from(user),
                chat: ChatTarget(user.to_string()),
                kind,
            })
            .await
    }

    pub async fn start(&self, user: &str) -> Vec<OutboundEffect> {
        self.send(user, InboundKind::Command(Command::Start)).await
    }

    pub async fn cancel_command(&self, user: &str) -> Vec<OutboundEffect> {
        self.send(user, InboundKind::Command(Command::Cancel)).await
    }

    pub async fn skip_command(&self, user: &str) -> Vec<OutboundEffect> {
        self.send(user, InboundKind::Command(Command::Skip)).await
    }

    pub async fn press(&self, user: &str, action: Action) -> Vec<OutboundEffect> {
        self.send(user, InboundKind::Button(action)).await
    }

    pub async fn text(&self, user: &str, text: &str) -> Vec<OutboundEffect> {
        self.send(user, InboundKind::Text(text.to_string())).await
    }

    pub async fn photo(&self, user: &str, token: &str, data: &[u8]) -> Vec<OutboundEffect> {
        self.send(
            user,
            InboundKind::Attachment {
                token: token.to_string(),
                data: data.to_vec(),
            },
        )
        .await
    }

    /// Current state and session for `user`.
    pub async fn snapshot(&self, user: &str) -> Option<(SessionState, Option<Session>)> {
        self.controller
            .sessions()
            .snapshot(&UserId::from(user))
            .await
    }

    /// Current state for `user`, or `Terminated` if the user never interacted.
    pub async fn state(&self, user: &str) -> SessionState {
        self.snapshot(user)
            .await
            .map(|(state, _)| state)
            .unwrap_or(SessionState::Terminated)
    }

    /// Current session for `user`, if any.
    pub async fn session(&self, user: &str) -> Option<Session> {
        self.snapshot(user).await.and_then(|(_, session)| session)
    }

    /// Number of attachment files across all per-user directories.
    pub fn attachment_file_count(&self) -> usize {
        let Ok(user_dirs) = std::fs::read_dir(&self.image_dir) else {
            return 0;
        };
        user_dirs
            .flatten()
            .filter_map(|dir| std::fs::read_dir(dir.path()).ok())
            .map(|files| files.flatten().filter(|f| f.path().is_file()).count())
            .sum()
    }
}

/// Text of each `Text` effect, prompt of each `Menu`, caption of each `Photo`.
pub fn headlines(effects: &[OutboundEffect]) -> Vec<&str> {
    effects.iter().filter_map(|e| e.headline()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_starts_a_fresh_session() {
        let harness = TestHarness::new().await.unwrap();
        let effects = harness.start("u1").await;
        assert!(!effects.is_empty());
        assert_eq!(harness.state("u1").await, SessionState::SelectingField);
        assert_eq!(harness.attachment_file_count(), 0);
    }

    #[tokio::test]
    async fn unknown_user_reports_terminated() {
        let harness = TestHarness::new().await.unwrap();
        assert_eq!(harness.state("nobody").await, SessionState::Terminated);
        assert!(harness.session("nobody").await.is_none());
    }
}
