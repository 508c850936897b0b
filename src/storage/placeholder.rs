use async_trait::async_trait;
use tracing::debug;

use super::{ObjectStore, StoredObject};
use crate::error::KaptanError;

/// Stand-in used when no image host is configured. Nothing is persisted; the
/// URL only echoes the key.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderStore;

#[async_trait]
impl ObjectStore for PlaceholderStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _mime: &str,
    ) -> Result<StoredObject, KaptanError> {
        debug!(key, size = bytes.len(), "placeholder upload");
        Ok(StoredObject {
            url: format!("/placeholder/{key}"),
            reference_id: key.to_string(),
        })
    }

    async fn delete(&self, reference_id: &str) -> Result<(), KaptanError> {
        debug!(reference_id, "placeholder delete");
        Ok(())
    }
}
