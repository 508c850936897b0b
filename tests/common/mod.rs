#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::IntoResponse,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use chrono::Utc;
use serde_json::Value;
use std::{
    fs,
    path::PathBuf,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

use kaptan::auth::{CookiePolicy, OwnerPolicy, SessionClaims, session};
use kaptan::config::Config;
use kaptan::db::{SqlitePool, Store};
use kaptan::db::repos::UserUpsert;
use kaptan::router::{KaptanState, kaptan_router};
use kaptan::storage::PlaceholderStore;

pub const OWNER: &str = "owner@viyakaptan.com";

pub struct TestApp {
    pub app: Router,
    pub state: KaptanState,
    db_path: PathBuf,
}

impl TestApp {
    /// Side connection to the app's database for arranging store faults.
    pub async fn raw_pool(&self) -> SqlitePool {
        SqlitePool::connect(&format!("sqlite:{}", self.db_path.display()))
            .await
            .expect("failed to open side connection")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = fs::remove_file(format!("{}{suffix}", self.db_path.display()));
        }
    }
}

pub async fn spawn_app(name: &str) -> TestApp {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut db_path = std::env::temp_dir();
    db_path.push(format!(
        "kaptan-{name}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));

    let mut cfg = Config::default();
    cfg.owner_open_id = OWNER.to_string();

    let database_url = format!("sqlite:{}", db_path.display());
    let store = Store::connect(&database_url, OwnerPolicy::new(cfg.owner_open_id.clone()))
        .await
        .expect("failed to open test store");
    let state = KaptanState::new(store, Arc::new(PlaceholderStore), &cfg)
        .expect("failed to build state");
    let app = kaptan_router(state.clone());

    TestApp {
        app,
        state,
        db_path,
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<String>, Value) {
    let resp = app.clone().oneshot(req).await.expect("request failed");
    let status = resp.status();
    let cookies = resp
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect();
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("response body was not json")
    };
    (status, cookies, json)
}

pub async fn rpc_get(
    app: &Router,
    procedure: &str,
    input: Option<Value>,
    cookie: Option<&str>,
) -> (StatusCode, Value) {
    let mut uri = format!("/api/rpc/{procedure}");
    if let Some(input) = input {
        let encoded: String =
            url::form_urlencoded::byte_serialize(input.to_string().as_bytes()).collect();
        uri.push_str(&format!("?input={encoded}"));
    }
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let req = builder.body(Body::empty()).expect("failed to build request");
    let (status, _, body) = send(app, req).await;
    (status, body)
}

pub async fn rpc_post(
    app: &Router,
    procedure: &str,
    input: Value,
    cookie: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(format!("/api/rpc/{procedure}"))
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let req = builder
        .body(Body::from(input.to_string()))
        .expect("failed to build request");
    let (status, _, body) = send(app, req).await;
    (status, body)
}

/// `name=value` part of a `Set-Cookie` header.
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

pub async fn admin_login(app: &Router) -> String {
    let req = Request::builder()
        .method("POST")
        .uri("/api/admin-login")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::HOST, "localhost:3000")
        .body(Body::from(r#"{"username":"admin","password":"admin123"}"#))
        .expect("failed to build request");
    let (status, cookies, _) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    cookie_pair(cookies.first().expect("login sets a cookie"))
}

/// Session cookie for an arbitrary identity, created in the store first.
pub async fn session_for(state: &KaptanState, open_id: &str) -> String {
    state
        .store
        .users()
        .upsert(UserUpsert::new(open_id))
        .await
        .expect("failed to create user");
    let policy = CookiePolicy::resolve("localhost", &[], "http", None);
    let claims = SessionClaims::new(open_id, open_id, Utc::now());
    let jar = session::issue(PrivateCookieJar::new(state.key.clone()), &policy, &claims)
        .expect("failed to issue session");
    let resp = (jar, ()).into_response();
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("jar sets a cookie");
    cookie_pair(set_cookie)
}
