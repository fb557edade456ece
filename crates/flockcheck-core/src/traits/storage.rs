// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store trait for durable persistence of inspection records.

use async_trait::async_trait;

use crate::error::FlockError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{AttachmentRef, FieldValues, Record, RecordId, UserId};

/// Durable persistence of inspection records, addressable by user or record id.
///
/// Calls for different users are independent. Calls for the same user are
/// issued sequentially by the session controller.
#[async_trait]
pub trait RecordStore: PluginAdapter {
    /// Prepares the backend (connection, migrations).
    async fn initialize(&self) -> Result<(), FlockError>;

    /// Flushes pending writes and releases connections.
    async fn close(&self) -> Result<(), FlockError>;

    /// Inserts a new record and returns its id.
    async fn create_record(
        &self,
        user: &UserId,
        values: &FieldValues,
        attachment: Option<&AttachmentRef>,
    ) -> Result<RecordId, FlockError>;

    /// Overwrites the value slots and attachment of an existing record.
    ///
    /// Fails with [`FlockError::NotFound`] if `id` does not exist.
    async fn update_record(
        &self,
        id: RecordId,
        values: &FieldValues,
        attachment: Option<&AttachmentRef>,
    ) -> Result<(), FlockError>;

    /// Fetches a record by id.
    async fn get_record(&self, id: RecordId) -> Result<Option<Record>, FlockError>;

    /// Returns the most recently created record for `user`.
    async fn latest_record_for_user(&self, user: &UserId) -> Result<Option<Record>, FlockError>;

    /// Deletes the most recently created record for `user`.
    ///
    /// Returns the deleted record, or `None` when the user has no records.
    async fn delete_latest_for_user(&self, user: &UserId) -> Result<Option<Record>, FlockError>;
}
