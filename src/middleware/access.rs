use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::PrivateCookieJar;
use chrono::Utc;
use std::convert::Infallible;
use tracing::{debug, warn};

use crate::auth::session;
use crate::db::Store;
use crate::db::models::User;
use crate::error::KaptanError;
use crate::router::KaptanState;

/// Who is calling. Anonymous unless a valid session names a known user.
#[derive(Debug, Clone, Default)]
pub struct AccessContext {
    pub user: Option<User>,
}

impl AccessContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Resolve the caller from the session cookie. Never fails: every
    /// problem along the way reads as anonymous.
    pub async fn from_jar(jar: &PrivateCookieJar, store: &Store) -> Self {
        let Some(claims) = session::read(jar, Utc::now()) else {
            return Self::anonymous();
        };
        match store.users().get_by_open_id(&claims.open_id).await {
            Ok(Some(user)) => Self { user: Some(user) },
            Ok(None) => {
                debug!(open_id = %claims.open_id, "session names an unknown user");
                Self::anonymous()
            }
            Err(e) => {
                warn!(open_id = %claims.open_id, error = %e, "user lookup failed; treating caller as anonymous");
                Self::anonymous()
            }
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }

    pub fn require_user(&self) -> Result<&User, KaptanError> {
        self.user.as_ref().ok_or(KaptanError::Unauthenticated)
    }

    pub fn require_admin(&self) -> Result<&User, KaptanError> {
        let user = self.require_user()?;
        if !user.is_admin() {
            return Err(KaptanError::Forbidden);
        }
        Ok(user)
    }
}

impl FromRequestParts<KaptanState> for AccessContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &KaptanState,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::from_headers(&parts.headers, state.key.clone());
        Ok(Self::from_jar(&jar, &state.store).await)
    }
}
