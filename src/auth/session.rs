use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::debug;

use super::cookie_policy::CookiePolicy;
use crate::config::MIN_SECRET_LEN;
use crate::error::KaptanError;

pub const COOKIE_NAME: &str = "app_session_id";
pub const SESSION_TTL_DAYS: i64 = 365;

/// Payload carried inside the private session cookie. The jar encrypts and
/// authenticates it, so a decoded value is trusted apart from its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub open_id: String,
    pub name: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionClaims {
    pub fn new(open_id: impl Into<String>, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            open_id: open_id.into(),
            name: name.into(),
            expires_at: now + ChronoDuration::days(SESSION_TTL_DAYS),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Derive the cookie encryption key from the configured secret.
pub fn derive_key(secret: &str) -> Result<Key, KaptanError> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(KaptanError::Config(format!(
            "session secret must be at least {MIN_SECRET_LEN} bytes"
        )));
    }
    Ok(Key::derive_from(secret.as_bytes()))
}

/// Add the session cookie, carrying `claims`, to the jar.
pub fn issue(
    jar: PrivateCookieJar,
    policy: &CookiePolicy,
    claims: &SessionClaims,
) -> Result<PrivateCookieJar, KaptanError> {
    let value = serde_json::to_string(claims)?;
    let cookie = Cookie::build(policy.apply(Cookie::new(COOKIE_NAME, value)))
        .max_age(Duration::days(SESSION_TTL_DAYS))
        .build();
    Ok(jar.add(cookie))
}

/// Remove the session cookie using the same attributes it was set with.
pub fn clear(jar: PrivateCookieJar, policy: &CookiePolicy) -> PrivateCookieJar {
    jar.remove(policy.apply(Cookie::from(COOKIE_NAME)))
}

/// Read and validate the session claims. Missing, undecryptable, malformed or
/// expired cookies all read as "no session".
pub fn read(jar: &PrivateCookieJar, now: DateTime<Utc>) -> Option<SessionClaims> {
    let cookie = jar.get(COOKIE_NAME)?;
    let claims: SessionClaims = match serde_json::from_str(cookie.value()) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "discarding malformed session cookie");
            return None;
        }
    };
    if claims.is_expired(now) {
        debug!(open_id = %claims.open_id, "session expired");
        return None;
    }
    Some(claims)
}
