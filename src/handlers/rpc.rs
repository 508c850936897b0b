use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Uri},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;
use serde_json::{Value, json};

use super::json_body;
use crate::api::{self, LOGOUT_PROCEDURE};
use crate::auth::{CookiePolicy, session};
use crate::error::KaptanError;
use crate::middleware::AccessContext;
use crate::router::KaptanState;

#[derive(Debug, Deserialize)]
pub struct RpcQuery {
    /// JSON-encoded procedure input.
    pub input: Option<String>,
}

/// GET /api/rpc/{procedure}?input=<json>
pub async fn rpc_query_handler(
    State(state): State<KaptanState>,
    Path(procedure): Path<String>,
    Query(query): Query<RpcQuery>,
    ctx: AccessContext,
    jar: PrivateCookieJar,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, KaptanError> {
    let input = match query.input.as_deref() {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(raw)?,
        _ => Value::Null,
    };
    call(&state, &ctx, &procedure, input, jar, &headers, &uri).await
}

/// POST /api/rpc/{procedure} with the input as the JSON body.
pub async fn rpc_mutation_handler(
    State(state): State<KaptanState>,
    Path(procedure): Path<String>,
    ctx: AccessContext,
    jar: PrivateCookieJar,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Result<Response, KaptanError> {
    let input: Value = json_body(&body)?;
    call(&state, &ctx, &procedure, input, jar, &headers, &uri).await
}

async fn call(
    state: &KaptanState,
    ctx: &AccessContext,
    procedure: &str,
    input: Value,
    jar: PrivateCookieJar,
    headers: &HeaderMap,
    uri: &Uri,
) -> Result<Response, KaptanError> {
    let result = api::dispatch(state, ctx, procedure, input).await?;
    let body = Json(json!({ "result": result }));

    if procedure == LOGOUT_PROCEDURE {
        let policy = CookiePolicy::from_headers(headers, uri.scheme_str(), state.cookie_domain());
        return Ok((session::clear(jar, &policy), body).into_response());
    }
    Ok(body.into_response())
}
