// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem attachment store.
//!
//! Attachments are written to `<directory>/<user>/<token>.<extension>`. Each
//! user gets a directory of their own, so two users can never share a file.
//! Path components that are not plain identifiers are replaced by a digest so
//! a user id or transport token can never escape the directory.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use flockcheck_config::model::AttachmentConfig;
use flockcheck_core::{
    AdapterType, AttachmentRef, AttachmentStore, FlockError, HealthStatus, PluginAdapter, UserId,
};

const MAX_TOKEN_LEN: usize = 64;

/// Stores attachment bytes as files under a configured directory.
pub struct FsAttachmentStore {
    config: AttachmentConfig,
}

impl FsAttachmentStore {
    pub fn new(config: AttachmentConfig) -> Self {
        Self { config }
    }

    /// The file path for a `{user, token}` pair.
    pub fn path_for(&self, user: &UserId, token: &str) -> PathBuf {
        let file_name = format!(
            "{}.{}",
            path_component(token, MAX_TOKEN_LEN),
            self.config.extension
        );
        PathBuf::from(&self.config.directory)
            .join(path_component(user.as_str(), usize::MAX))
            .join(file_name)
    }
}

/// Keeps `raw` verbatim if it is a short identifier, otherwise hashes it.
fn path_component(raw: &str, max_len: usize) -> String {
    let plain = !raw.is_empty()
        && raw.len() <= max_len
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if plain {
        raw.to_string()
    } else {
        let digest = hex::encode(Sha256::digest(raw.as_bytes()));
        digest[..32].to_string()
    }
}

fn io_err(message: String, e: std::io::Error) -> FlockError {
    FlockError::Attachment {
        message,
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl PluginAdapter for FsAttachmentStore {
    fn name(&self) -> &str {
        "fs-attachments"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Attachment
    }

    async fn health_check(&self) -> Result<HealthStatus, FlockError> {
        match tokio::fs::metadata(&self.config.directory).await {
            Ok(meta) if meta.is_dir() => Ok(HealthStatus::Healthy),
            Ok(_) => Ok(HealthStatus::Unhealthy(format!(
                "{} is not a directory",
                self.config.directory
            ))),
            // Created lazily on first store.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HealthStatus::Degraded(format!(
                "{} does not exist yet",
                self.config.directory
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), FlockError> {
        Ok(())
    }
}

#[async_trait]
impl AttachmentStore for FsAttachmentStore {
    async fn store(
        &self,
        user: &UserId,
        token: &str,
        data: &[u8],
    ) -> Result<AttachmentRef, FlockError> {
        let path = self.path_for(user, token);
        if let Some(user_dir) = path.parent() {
            tokio::fs::create_dir_all(user_dir)
                .await
                .map_err(|e| io_err(format!("cannot create {}", user_dir.display()), e))?;
        }
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| io_err(format!("cannot write {}", path.display()), e))?;

        debug!(user = %user, path = %path.display(), bytes = data.len(), "attachment stored");
        Ok(AttachmentRef(path.to_string_lossy().into_owned()))
    }

    async fn open(&self, reference: &AttachmentRef) -> Result<Vec<u8>, FlockError> {
        match tokio::fs::read(reference.as_str()).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(FlockError::NotFound {
                entity: "attachment",
                id: reference.to_string(),
            }),
            Err(e) => Err(io_err(format!("cannot read {reference}"), e)),
        }
    }

    async fn delete(&self, reference: &AttachmentRef) -> Result<(), FlockError> {
        match tokio::fs::remove_file(reference.as_str()).await {
            Ok(()) => {
                debug!(path = %reference, "attachment deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %reference, "attachment already absent");
                Ok(())
            }
            Err(e) => Err(io_err(format!("cannot delete {reference}"), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &std::path::Path) -> FsAttachmentStore {
        FsAttachmentStore::new(AttachmentConfig {
            directory: dir.join("images").to_string_lossy().into_owned(),
            extension: "jpg".to_string(),
        })
    }

    #[test]
    fn plain_components_are_kept() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let path = store.path_for(&UserId::from("12345"), "AgAD-x_9");
        assert_eq!(path, dir.path().join("images/12345/AgAD-x_9.jpg"));
    }

    #[test]
    fn unsafe_components_are_hashed() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let path = store.path_for(&UserId::from("../etc"), "tok/en");
        let relative = path.strip_prefix(dir.path().join("images")).unwrap();
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        assert_eq!(parts.len(), 2, "{parts:?}");
        assert_eq!(parts[0].len(), 32);
        // 32 hex chars + ".jpg"
        assert_eq!(parts[1].len(), 32 + 4);
        assert!(parts.iter().all(|p| !p.contains("..")));
    }

    #[test]
    fn long_tokens_are_hashed() {
        let long = "a".repeat(MAX_TOKEN_LEN + 1);
        assert_eq!(path_component(&long, MAX_TOKEN_LEN).len(), 32);
        let exact = "a".repeat(MAX_TOKEN_LEN);
        assert_eq!(path_component(&exact, MAX_TOKEN_LEN), exact);
    }

    #[tokio::test]
    async fn store_open_delete_lifecycle() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let user = UserId::from("u1");

        let reference = store.store(&user, "file1", b"jpeg-bytes").await.unwrap();
        assert_eq!(store.open(&reference).await.unwrap(), b"jpeg-bytes");

        store.delete(&reference).await.unwrap();
        let err = store.open(&reference).await.unwrap_err();
        assert!(err.is_not_found());

        // Deleting again is not an error.
        store.delete(&reference).await.unwrap();
    }

    #[tokio::test]
    async fn users_with_overlapping_names_get_separate_files() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let first = store
            .store(&UserId::from("1"), "2_x", b"first user photo")
            .await
            .unwrap();
        let second = store
            .store(&UserId::from("1_2"), "x", b"second user photo")
            .await
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(store.open(&first).await.unwrap(), b"first user photo");
        assert_eq!(store.open(&second).await.unwrap(), b"second user photo");

        store.delete(&second).await.unwrap();
        assert_eq!(store.open(&first).await.unwrap(), b"first user photo");
    }

    #[tokio::test]
    async fn same_user_and_token_overwrite() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let user = UserId::from("u1");

        let first = store.store(&user, "same", b"one").await.unwrap();
        let second = store.store(&user, "same", b"two").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.open(&second).await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn health_check_reports_missing_directory_as_degraded() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(matches!(
            store.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
        store.store(&UserId::from("u"), "t", b"x").await.unwrap();
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }
}
