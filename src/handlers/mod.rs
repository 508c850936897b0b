pub mod auth;
pub mod health;
pub mod rpc;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::KaptanError;

/// Decode a JSON request body; an empty body decodes as `null`.
fn json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, KaptanError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_slice(body)?)
}
