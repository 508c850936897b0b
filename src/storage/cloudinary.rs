use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{error, info};

use super::{ObjectStore, StoredObject};
use crate::config::CloudinaryConfig;
use crate::error::KaptanError;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Signed uploads to Cloudinary's REST API.
#[derive(Debug, Clone)]
pub struct CloudinaryStore {
    client: reqwest::Client,
    cfg: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl CloudinaryStore {
    pub fn new(client: reqwest::Client, cfg: CloudinaryConfig) -> Self {
        Self { client, cfg }
    }

    /// SHA-256 over the alphabetically sorted `k=v` pairs followed by the
    /// API secret.
    fn sign(&self, params: &mut [(&'static str, String)]) -> String {
        params.sort_by(|a, b| a.0.cmp(b.0));
        let joined = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{:x}", Sha256::digest(format!("{joined}{}", self.cfg.api_secret)))
    }

    fn signed_form(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        params.push(("timestamp", Utc::now().timestamp().to_string()));
        let signature = self.sign(&mut params);
        params.push(("api_key", self.cfg.api_key.clone()));
        params.push(("signature", signature));
        params.push(("signature_algorithm", "sha256".to_string()));
        params
    }

    async fn post<T>(&self, url: String, form: Vec<(&'static str, String)>) -> Result<T, KaptanError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let resp = self
            .client
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| KaptanError::UpstreamStorage(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| KaptanError::UpstreamStorage(e.to_string()))?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            error!(%status, %message, "Cloudinary request rejected");
            return Err(KaptanError::UpstreamStorage(format!("{status}: {message}")));
        }
        serde_json::from_slice(&body).map_err(|e| KaptanError::UpstreamStorage(e.to_string()))
    }
}

/// Public id for a storage key: the key without its file extension.
fn public_id(key: &str) -> &str {
    match key.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.contains('/') => stem,
        _ => key,
    }
}

#[async_trait]
impl ObjectStore for CloudinaryStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> Result<StoredObject, KaptanError> {
        let size = bytes.len();
        let data_uri = format!("data:{mime};base64,{}", STANDARD.encode(bytes));
        let mut form = self.signed_form(vec![
            ("folder", self.cfg.folder.clone()),
            ("overwrite", "false".to_string()),
            ("public_id", public_id(key).to_string()),
        ]);
        form.push(("file", data_uri));

        let url = format!("{API_BASE}/{}/auto/upload", self.cfg.cloud_name);
        let uploaded: UploadResponse = self.post(url, form).await?;
        info!(key, size, public_id = %uploaded.public_id, "uploaded to Cloudinary");
        Ok(StoredObject {
            url: uploaded.secure_url,
            reference_id: uploaded.public_id,
        })
    }

    async fn delete(&self, reference_id: &str) -> Result<(), KaptanError> {
        let form = self.signed_form(vec![("public_id", reference_id.to_string())]);
        let url = format!("{API_BASE}/{}/image/destroy", self.cfg.cloud_name);
        let destroyed: DestroyResponse = self.post(url, form).await?;
        info!(reference_id, result = %destroyed.result, "deleted from Cloudinary");
        Ok(())
    }
}
