// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store wrapper that injects storage failures on demand.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::debug;

use flockcheck_core::{
    AdapterType, AttachmentRef, FieldValues, FlockError, HealthStatus, PluginAdapter, Record,
    RecordId, RecordStore, UserId,
};

/// Delegates to an inner store unless failures are switched on, in which
/// case every record operation fails with `FlockError::Storage`.
pub struct FlakyRecordStore {
    inner: Arc<dyn RecordStore>,
    failing: AtomicBool,
    injected: AtomicUsize,
}

impl FlakyRecordStore {
    pub fn new(inner: Arc<dyn RecordStore>) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
            injected: AtomicUsize::new(0),
        }
    }

    /// Switch failure injection on or off.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of operations that failed because of injection.
    pub fn injected_failures(&self) -> usize {
        self.injected.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), FlockError> {
        if self.failing.load(Ordering::SeqCst) {
            let count = self.injected.fetch_add(1, Ordering::SeqCst) + 1;
            debug!(count, "injecting storage failure");
            return Err(FlockError::Storage {
                source: "injected storage failure".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for FlakyRecordStore {
    fn name(&self) -> &str {
        "flaky"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, FlockError> {
        if self.failing.load(Ordering::SeqCst) {
            return Ok(HealthStatus::Unhealthy("failure injection active".into()));
        }
        self.inner.health_check().await
    }

    async fn shutdown(&self) -> Result<(), FlockError> {
        self.inner.shutdown().await
    }
}

#[async_trait]
impl RecordStore for FlakyRecordStore {
    async fn initialize(&self) -> Result<(), FlockError> {
        self.inner.initialize().await
    }

    async fn close(&self) -> Result<(), FlockError> {
        self.inner.close().await
    }

    async fn create_record(
        &self,
        user: &UserId,
        values: &FieldValues,
        attachment: Option<&AttachmentRef>,
    ) -> Result<RecordId, FlockError> {
        self.check()?;
        self.inner.create_record(user, values, attachment).await
    }

    async fn update_record(
        &self,
        id: RecordId,
        values: &FieldValues,
        attachment: Option<&AttachmentRef>,
    ) -> Result<(), FlockError> {
        self.check()?;
        self.inner.update_record(id, values, attachment).await
    }

    async fn get_record(&self, id: RecordId) -> Result<Option<Record>, FlockError> {
        self.check()?;
        self.inner.get_record(id).await
    }

    async fn latest_record_for_user(&self, user: &UserId) -> Result<Option<Record>, FlockError> {
        self.check()?;
        self.inner.latest_record_for_user(user).await
    }

    async fn delete_latest_for_user(&self, user: &UserId) -> Result<Option<Record>, FlockError> {
        self.check()?;
        self.inner.delete_latest_for_user(user).await
    }
}
