use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum KaptanError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] serde_json::Error),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Admin access required")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(SqlxError),

    #[error("Database error: {0}")]
    Database(SqlxError),

    #[error("Object storage error: {0}")]
    UpstreamStorage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl KaptanError {
    pub fn validation(msg: impl Into<String>) -> Self {
        KaptanError::Validation(msg.into())
    }

    /// True for failures caused by the store being unreachable rather than
    /// by the request itself.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, KaptanError::StoreUnavailable(_))
    }
}

impl From<SqlxError> for KaptanError {
    fn from(e: SqlxError) -> Self {
        match &e {
            SqlxError::Database(db) if db.is_unique_violation() => {
                KaptanError::Validation(format!("duplicate value: {}", db.message()))
            }
            SqlxError::Database(db) if db.is_foreign_key_violation() => {
                KaptanError::Validation(format!("unknown reference: {}", db.message()))
            }
            SqlxError::PoolTimedOut
            | SqlxError::PoolClosed
            | SqlxError::Io(_)
            | SqlxError::Tls(_)
            | SqlxError::WorkerCrashed => KaptanError::StoreUnavailable(e),
            _ => KaptanError::Database(e),
        }
    }
}

impl From<base64::DecodeError> for KaptanError {
    fn from(e: base64::DecodeError) -> Self {
        KaptanError::Validation(format!("invalid base64 payload: {e}"))
    }
}

impl IntoResponse for KaptanError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match &self {
            KaptanError::Validation(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            KaptanError::InvalidInput(e) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", e.to_string()),
            KaptanError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Please login.".to_string(),
            ),
            KaptanError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid username or password.".to_string(),
            ),
            KaptanError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Admin access required.".to_string(),
            ),
            KaptanError::NotFound(what) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", format!("{what} not found."))
            }
            KaptanError::StoreUnavailable(e) => {
                error!(error = %e, "store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "The data store is temporarily unavailable.".to_string(),
                )
            }
            KaptanError::UpstreamStorage(msg) => {
                error!(error = %msg, "object storage failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_STORAGE",
                    "Media storage is unavailable.".to_string(),
                )
            }
            KaptanError::Database(_) | KaptanError::Config(_) => {
                error!(error = %self, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred.".to_string(),
                )
            }
        };
        let body = ApiErrorBody {
            code: code.to_string(),
            message,
        };
        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
