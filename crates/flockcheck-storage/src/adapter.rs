// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`RecordStore`] backed by the `poultry_health` SQLite table.

use async_trait::async_trait;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use flockcheck_config::model::StorageConfig;
use flockcheck_core::{
    AdapterType, AttachmentRef, FieldValues, FlockError, HealthStatus, PluginAdapter, Record,
    RecordId, RecordStore, UserId,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// Record store over a single SQLite connection.
///
/// Nothing touches the disk until [`RecordStore::initialize`] opens the file
/// and runs migrations. Closing truncates the WAL once; later closes are no-ops.
pub struct SqliteRecordStore {
    config: StorageConfig,
    db: OnceCell<Database>,
    checkpointed: Mutex<bool>,
}

impl SqliteRecordStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
            checkpointed: Mutex::new(false),
        }
    }

    fn db(&self) -> Result<&Database, FlockError> {
        self.db.get().ok_or_else(|| FlockError::Storage {
            source: "record store used before initialize()".into(),
        })
    }

    async fn checkpoint(&self) -> Result<(), FlockError> {
        let Some(db) = self.db.get() else {
            return Ok(());
        };
        let mut done = self.checkpointed.lock().await;
        if !*done {
            db.connection()
                .call(|conn| conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);"))
                .await
                .map_err(map_tr_err)?;
            *done = true;
            debug!(path = %self.config.database_path, "WAL truncated");
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SqliteRecordStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, FlockError> {
        let count: i64 = self
            .db()?
            .connection()
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM poultry_health", [], |row| row.get(0)))
            .await
            .map_err(map_tr_err)?;
        debug!(records = count, "record store healthy");
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FlockError> {
        self.checkpoint().await
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn initialize(&self) -> Result<(), FlockError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| FlockError::Storage {
            source: "record store initialized twice".into(),
        })?;
        debug!(path = %self.config.database_path, "record store opened");
        Ok(())
    }

    async fn close(&self) -> Result<(), FlockError> {
        self.db()?;
        self.checkpoint().await
    }

    async fn create_record(
        &self,
        user: &UserId,
        values: &FieldValues,
        attachment: Option<&AttachmentRef>,
    ) -> Result<RecordId, FlockError> {
        let id = queries::records::insert_record(self.db()?, user, values, attachment).await?;
        debug!(user = %user, record_id = %id, filled = values.len(), "record created");
        Ok(id)
    }

    async fn update_record(
        &self,
        id: RecordId,
        values: &FieldValues,
        attachment: Option<&AttachmentRef>,
    ) -> Result<(), FlockError> {
        queries::records::update_record(self.db()?, id, values, attachment).await?;
        debug!(record_id = %id, filled = values.len(), "record updated");
        Ok(())
    }

    async fn get_record(&self, id: RecordId) -> Result<Option<Record>, FlockError> {
        queries::records::get_record(self.db()?, id).await
    }

    async fn latest_record_for_user(&self, user: &UserId) -> Result<Option<Record>, FlockError> {
        queries::records::latest_for_user(self.db()?, user).await
    }

    async fn delete_latest_for_user(&self, user: &UserId) -> Result<Option<Record>, FlockError> {
        let deleted = queries::records::delete_latest_for_user(self.db()?, user).await?;
        if let Some(record) = &deleted {
            debug!(user = %user, record_id = %record.id, "latest record deleted");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flockcheck_core::FieldId;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_store_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let store = SqliteRecordStore::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.version(), semver::Version::new(0, 1, 0));
        assert_eq!(store.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let store = SqliteRecordStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let store = SqliteRecordStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(store.initialize().await.is_err());
    }

    #[tokio::test]
    async fn operations_fail_before_initialize() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let store = SqliteRecordStore::new(make_config(db_path.to_str().unwrap()));

        assert!(store.health_check().await.is_err());
        assert!(
            store
                .latest_record_for_user(&UserId::from("u"))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn health_check_returns_healthy_when_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let store = SqliteRecordStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn partial_record_resumes_and_completes_in_place() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let store = SqliteRecordStore::new(make_config(db_path.to_str().unwrap()));
        store.initialize().await.unwrap();
        let user = UserId::from("farmer-1");

        let mut values = FieldValues::new();
        values.set(FieldId::Weight, "1.5");
        let id = store.create_record(&user, &values, None).await.unwrap();

        let latest = store.latest_record_for_user(&user).await.unwrap().unwrap();
        assert_eq!(latest.id, id);
        assert!(!latest.is_complete());

        let mut values = latest.values.clone();
        values.set(FieldId::Temperature, "41.5");
        values.set(FieldId::MedicationNotes, "none");
        values.set(FieldId::SymptomNotes, "lethargy");
        store.update_record(id, &values, None).await.unwrap();

        let record = store.get_record(id).await.unwrap().unwrap();
        assert!(record.is_complete());
        assert_eq!(record.created_at, latest.created_at);

        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn close_then_shutdown_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("shutdown.db");
        let store = SqliteRecordStore::new(make_config(db_path.to_str().unwrap()));
        store.initialize().await.unwrap();
        store
            .create_record(&UserId::from("u"), &FieldValues::new(), None)
            .await
            .unwrap();

        store.close().await.unwrap();
        store.shutdown().await.unwrap();
    }
}
