use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Uri},
    response::IntoResponse,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use super::json_body;
use crate::auth::{CookiePolicy, SessionClaims, session};
use crate::db::models::Role;
use crate::db::repos::UserUpsert;
use crate::db::{Patch, WriteOutcome};
use crate::error::KaptanError;
use crate::router::KaptanState;

const ADMIN_NAME: &str = "Admin";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/admin-login -> checks the configured credentials and opens a
/// session for the owner identity.
pub async fn admin_login_handler(
    State(state): State<KaptanState>,
    jar: PrivateCookieJar,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Result<impl IntoResponse, KaptanError> {
    let req: Option<LoginRequest> = json_body(&body)?;
    let req = req.unwrap_or_default();
    let admin = &state.admin;

    let user_ok = req.username.as_bytes().ct_eq(admin.username.as_bytes());
    let pass_ok = req.password.as_bytes().ct_eq(admin.password.as_bytes());
    if !bool::from(user_ok & pass_ok) {
        warn!("rejected admin login");
        return Err(KaptanError::InvalidCredentials);
    }

    let now = Utc::now();
    let bookkeeping = UserUpsert {
        open_id: admin.open_id.clone(),
        name: Patch::Value(ADMIN_NAME.to_string()),
        email: Patch::Value(admin.open_id.clone()),
        login_method: Patch::Absent,
        role: Some(Role::Admin),
        last_signed_in: Some(now),
    };
    match WriteOutcome::from(state.store.users().upsert(bookkeeping).await) {
        WriteOutcome::Applied(id) => info!(user_id = id, "admin signed in"),
        WriteOutcome::Skipped(e) => {
            warn!(error = %e, "store unavailable; admin sign-in not recorded")
        }
        WriteOutcome::Failed(e) => return Err(e),
    }

    let policy = CookiePolicy::from_headers(&headers, uri.scheme_str(), state.cookie_domain());
    let claims = SessionClaims::new(admin.open_id.clone(), ADMIN_NAME, now);
    let jar = session::issue(jar, &policy, &claims)?;
    Ok((jar, Json(json!({ "success": true }))))
}

/// POST /api/logout
pub async fn logout_handler(
    State(state): State<KaptanState>,
    jar: PrivateCookieJar,
    headers: HeaderMap,
    uri: Uri,
) -> impl IntoResponse {
    let policy = CookiePolicy::from_headers(&headers, uri.scheme_str(), state.cookie_domain());
    (session::clear(jar, &policy), Json(json!({ "success": true })))
}
