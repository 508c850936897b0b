//! RPC procedures, addressed as `<namespace>.<method>`.
//!
//! Every procedure takes one JSON input value and returns one JSON value.
//! Reads are public and filtered by [`AccessContext`]; writes require an
//! admin.

mod auth;
mod categories;
mod dashboard;
mod feature_cards;
mod hero_sections;
mod homepage;
mod media;
mod pages;
mod posts;
mod routes;
mod settings;
mod team_members;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::KaptanError;
use crate::middleware::AccessContext;
use crate::router::KaptanState;

pub const LOGOUT_PROCEDURE: &str = "auth.logout";
const DEFAULT_FEATURED_LIMIT: u32 = 3;

pub async fn dispatch(
    state: &KaptanState,
    ctx: &AccessContext,
    procedure: &str,
    input: Value,
) -> Result<Value, KaptanError> {
    let Some((namespace, method)) = procedure.split_once('.') else {
        return Err(unknown(procedure));
    };
    debug!(namespace, method, admin = ctx.is_admin(), "rpc call");
    let result = match namespace {
        "auth" => auth::call(ctx, method).await,
        "categories" => categories::call(state, ctx, method, input).await,
        "posts" => posts::call(state, ctx, method, input).await,
        "caravanRoutes" => routes::call(state, ctx, method, input).await,
        "siteSettings" => settings::call(state, ctx, method, input).await,
        "pages" => pages::call(state, ctx, method, input).await,
        "heroSections" => hero_sections::call(state, ctx, method, input).await,
        "featureCards" => feature_cards::call(state, ctx, method, input).await,
        "teamMembers" => team_members::call(state, ctx, method, input).await,
        "media" => media::call(state, ctx, method, input).await,
        "dashboard" => dashboard::call(state, ctx, method).await,
        "homepage" => homepage::call(state, method).await,
        _ => Err(unknown(procedure)),
    };
    result.map_err(|e| match e {
        KaptanError::NotFound(what) if what.is_empty() => unknown(procedure),
        other => other,
    })
}

fn unknown(procedure: &str) -> KaptanError {
    KaptanError::NotFound(format!("procedure `{procedure}`"))
}

/// Marker for a method name no namespace recognises; rewritten by
/// [`dispatch`] to name the full procedure.
fn no_such_method() -> KaptanError {
    KaptanError::NotFound(String::new())
}

/// Decode procedure input. A missing input arrives as JSON `null`, which
/// decodes into `Option::None` or into structs whose fields are all optional.
fn parse<T: DeserializeOwned>(input: Value) -> Result<T, KaptanError> {
    Ok(serde_json::from_value(input)?)
}

fn reply<T: Serialize>(value: T) -> Result<Value, KaptanError> {
    Ok(serde_json::to_value(value)?)
}

fn created(id: i64) -> Result<Value, KaptanError> {
    Ok(json!({ "id": id }))
}

fn success(applied: bool) -> Result<Value, KaptanError> {
    Ok(json!({ "success": applied }))
}

/// Split an update input `{id, ...fields}` into the id and the field patch.
fn split_id(input: Value) -> Result<(i64, Value), KaptanError> {
    let Value::Object(mut fields) = input else {
        return Err(KaptanError::validation("input must be an object"));
    };
    let id = fields
        .remove("id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| KaptanError::validation("id is required"))?;
    Ok((id, Value::Object(fields)))
}

/// Non-admins only ever see published / active records. Admins see the
/// same by default and may opt out.
fn visible_only(ctx: &AccessContext, requested: Option<bool>) -> bool {
    !ctx.is_admin() || requested.unwrap_or(true)
}

#[derive(Debug, serde::Deserialize)]
struct IdInput {
    id: i64,
}

#[derive(Debug, serde::Deserialize)]
struct SlugInput {
    slug: String,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PublishedFilter {
    published_only: Option<bool>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ActiveFilter {
    active_only: Option<bool>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct LimitInput {
    limit: Option<u32>,
}
