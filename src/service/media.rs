use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::Store;
use crate::db::repos::MediaCreate;
use crate::error::KaptanError;
use crate::storage::ObjectStore;

const DEFAULT_EXTENSION: &str = "jpg";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUpload {
    pub filename: String,
    pub base64: String,
    pub mime_type: String,
    pub alt: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedMedia {
    pub id: i64,
    pub url: String,
}

/// Text after the last `.`, or `jpg` when there is none or it is not plain
/// ASCII alphanumerics. The result ends up in object keys.
pub fn extension(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.bytes().all(|b| b.is_ascii_alphanumeric()) => {
            ext
        }
        _ => DEFAULT_EXTENSION,
    }
}

pub fn storage_key(filename: &str) -> String {
    format!("media/{}.{}", Uuid::new_v4(), extension(filename))
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

/// Decode, store the object, then record its metadata. If the metadata
/// write fails the object is removed again.
pub async fn upload(
    store: &Store,
    objects: &dyn ObjectStore,
    input: MediaUpload,
    uploaded_by: Option<i64>,
) -> Result<UploadedMedia, KaptanError> {
    if input.filename.trim().is_empty() {
        return Err(KaptanError::validation("filename must not be empty"));
    }
    let bytes = STANDARD.decode(input.base64.trim())?;
    let size = bytes.len();
    let key = storage_key(&input.filename);

    let stored = objects.put(&key, bytes, &input.mime_type).await?;

    let record = MediaCreate {
        filename: input.filename.clone(),
        original_name: Some(input.filename),
        mime_type: Some(input.mime_type),
        size: i64::try_from(size).ok(),
        url: stored.url.clone(),
        storage_key: Some(stored.reference_id.clone()),
        alt: non_empty(input.alt),
        caption: non_empty(input.caption),
        uploaded_by,
    };

    match store.media().create(record).await {
        Ok(id) => {
            info!(id, key = %key, size, "media uploaded");
            Ok(UploadedMedia { id, url: stored.url })
        }
        Err(e) => {
            if let Err(cleanup) = objects.delete(&stored.reference_id).await {
                warn!(reference_id = %stored.reference_id, error = %cleanup, "orphaned media object");
            }
            Err(e)
        }
    }
}

/// Remove the metadata row, then the stored object. A failed object delete
/// is logged only; the row is already gone.
pub async fn delete(
    store: &Store,
    objects: &dyn ObjectStore,
    id: i64,
) -> Result<bool, KaptanError> {
    let Some(media) = store.media().delete(id).await? else {
        return Ok(false);
    };
    if let Some(reference_id) = media.storage_key.as_deref()
        && let Err(e) = objects.delete(reference_id).await
    {
        warn!(id, reference_id, error = %e, "failed to delete stored media object");
    }
    Ok(true)
}
