// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fetching uploaded photos through the Bot API.

use flockcheck_core::FlockError;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{FileMeta, PhotoSize};
use tracing::debug;

fn media_error(what: &str, e: impl std::error::Error + Send + Sync + 'static) -> FlockError {
    FlockError::Channel {
        message: format!("{what}: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Resolves `file` with `getFile` and downloads its content.
pub async fn download_file(bot: &Bot, file: &FileMeta) -> Result<Vec<u8>, FlockError> {
    let remote = bot
        .get_file(file.id.clone())
        .await
        .map_err(|e| media_error("getFile failed", e))?;

    let mut bytes = Vec::with_capacity(file.size as usize);
    bot.download_file(&remote.path, &mut bytes)
        .await
        .map_err(|e| media_error("photo download failed", e))?;

    debug!(file_id = %file.id, bytes = bytes.len(), "photo downloaded");
    Ok(bytes)
}

/// The size with the most pixels; ties keep the later entry.
pub fn largest_photo(photos: &[PhotoSize]) -> Option<&PhotoSize> {
    photos
        .iter()
        .max_by_key(|p| u64::from(p.width) * u64::from(p.height))
}

/// Downloads the best resolution of an uploaded photo.
///
/// Returns the Telegram file id alongside the bytes.
pub async fn download_largest_photo(
    bot: &Bot,
    photos: &[PhotoSize],
) -> Result<(String, Vec<u8>), FlockError> {
    let Some(best) = largest_photo(photos) else {
        return Err(FlockError::Channel {
            message: "photo message carries no sizes".into(),
            source: None,
        });
    };
    let bytes = download_file(bot, &best.file).await?;
    Ok((best.file.id.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo_sizes() -> Vec<PhotoSize> {
        serde_json::from_value(serde_json::json!([
            { "file_id": "small", "file_unique_id": "s", "width": 90, "height": 90, "file_size": 1200 },
            { "file_id": "medium", "file_unique_id": "m", "width": 320, "height": 320, "file_size": 9000 },
            { "file_id": "large", "file_unique_id": "l", "width": 1280, "height": 1280, "file_size": 90000 },
        ]))
        .expect("failed to deserialize photo sizes")
    }

    #[test]
    fn largest_photo_has_most_pixels() {
        let photos = photo_sizes();
        let largest = largest_photo(&photos).unwrap();
        assert_eq!(largest.file.id.to_string(), "large");
        assert_eq!(largest.width, 1280);
    }

    #[test]
    fn largest_photo_ignores_listing_order() {
        let mut photos = photo_sizes();
        photos.reverse();
        assert_eq!(largest_photo(&photos).unwrap().file.id.to_string(), "large");
    }

    #[test]
    fn largest_photo_of_empty_list_is_none() {
        assert!(largest_photo(&[]).is_none());
    }

    #[tokio::test]
    async fn download_of_empty_photo_list_fails() {
        let bot = Bot::new("test:token");
        let err = download_largest_photo(&bot, &[]).await.unwrap_err();
        assert!(err.to_string().contains("no sizes"));
    }
}
