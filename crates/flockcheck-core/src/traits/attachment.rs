// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment store trait for binary uploads (photos of symptoms).

use async_trait::async_trait;

use crate::error::FlockError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{AttachmentRef, UserId};

/// Path-addressable byte store keyed by `{user, token}`.
#[async_trait]
pub trait AttachmentStore: PluginAdapter {
    /// Writes `data` at a location derived from `user` and `token` and returns its reference.
    async fn store(
        &self,
        user: &UserId,
        token: &str,
        data: &[u8],
    ) -> Result<AttachmentRef, FlockError>;

    /// Reads a stored attachment. Fails with [`FlockError::NotFound`] if absent.
    async fn open(&self, reference: &AttachmentRef) -> Result<Vec<u8>, FlockError>;

    /// Removes a stored attachment. An already-absent file is success.
    async fn delete(&self, reference: &AttachmentRef) -> Result<(), FlockError>;
}
