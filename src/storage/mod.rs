//! Object storage for uploaded media.

mod cloudinary;
mod placeholder;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

pub use cloudinary::CloudinaryStore;
pub use placeholder::PlaceholderStore;

use crate::config::CloudinaryConfig;
use crate::error::KaptanError;

/// Where a stored object ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Public URL of the object.
    pub url: String,
    /// Identifier the store needs to delete the object later.
    pub reference_id: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`. Failures map to `UpstreamStorage`.
    async fn put(&self, key: &str, bytes: Vec<u8>, mime: &str)
    -> Result<StoredObject, KaptanError>;

    async fn delete(&self, reference_id: &str) -> Result<(), KaptanError>;
}

/// Pick the configured backend, falling back to placeholder URLs.
pub fn from_config(
    cloudinary: Option<CloudinaryConfig>,
    client: reqwest::Client,
) -> Arc<dyn ObjectStore> {
    match cloudinary {
        Some(cfg) if !cfg.api_key.is_empty() && !cfg.api_secret.is_empty() => {
            info!(cloud = %cfg.cloud_name, folder = %cfg.folder, "media uploads go to Cloudinary");
            Arc::new(CloudinaryStore::new(client, cfg))
        }
        Some(cfg) => {
            warn!(cloud = %cfg.cloud_name, "Cloudinary credentials incomplete; using placeholder URLs");
            Arc::new(PlaceholderStore)
        }
        None => {
            warn!("Cloudinary not configured; using placeholder URLs");
            Arc::new(PlaceholderStore)
        }
    }
}
