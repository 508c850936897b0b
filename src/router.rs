use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    http::{Method, header},
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::auth::session::derive_key;
use crate::config::Config;
use crate::db::Store;
use crate::error::KaptanError;
use crate::handlers::{auth, health, rpc};
use crate::storage::ObjectStore;

/// Upload payloads arrive base64-encoded inside JSON.
pub const BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Credentials accepted by the admin login form.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
    pub open_id: String,
}

#[derive(Clone)]
pub struct KaptanState {
    pub store: Store,
    pub objects: Arc<dyn ObjectStore>,
    pub key: Key,
    pub cookie_domain: Option<Arc<str>>,
    pub admin: Arc<AdminCredentials>,
    pub media_list_limit: u32,
}

impl KaptanState {
    pub fn new(
        store: Store,
        objects: Arc<dyn ObjectStore>,
        cfg: &Config,
    ) -> Result<Self, KaptanError> {
        Ok(Self {
            store,
            objects,
            key: derive_key(&cfg.cookie_secret)?,
            cookie_domain: cfg.cookie_domain_override().map(Arc::from),
            admin: Arc::new(AdminCredentials {
                username: cfg.admin_username.clone(),
                password: cfg.admin_password.clone(),
                open_id: cfg.admin_open_id().to_string(),
            }),
            media_list_limit: cfg.media_list_limit,
        })
    }

    pub fn cookie_domain(&self) -> Option<&str> {
        self.cookie_domain.as_deref()
    }
}

impl FromRef<KaptanState> for Key {
    fn from_ref(state: &KaptanState) -> Self {
        state.key.clone()
    }
}

pub fn kaptan_router(state: KaptanState) -> Router {
    // The admin UI may live on another origin and needs the session cookie.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::SET_COOKIE])
        .max_age(Duration::from_secs(600));

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/admin-login", post(auth::admin_login_handler))
        .route("/api/logout", post(auth::logout_handler))
        .route(
            "/api/rpc/{procedure}",
            get(rpc::rpc_query_handler).post(rpc::rpc_mutation_handler),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors)
        .with_state(state)
}
