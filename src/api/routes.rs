use serde_json::Value;

use super::{
    DEFAULT_FEATURED_LIMIT, IdInput, LimitInput, PublishedFilter, SlugInput, created,
    no_such_method, parse, reply, split_id, success, visible_only,
};
use crate::db::models::CaravanRoute;
use crate::db::repos::{RouteCreate, RoutePatch};
use crate::error::KaptanError;
use crate::middleware::AccessContext;
use crate::router::KaptanState;

fn visible(ctx: &AccessContext, row: Option<CaravanRoute>) -> Option<CaravanRoute> {
    row.filter(|r| ctx.is_admin() || r.is_published)
}

pub(super) async fn call(
    state: &KaptanState,
    ctx: &AccessContext,
    method: &str,
    input: Value,
) -> Result<Value, KaptanError> {
    let repo = state.store.routes();
    match method {
        "list" => {
            let filter: Option<PublishedFilter> = parse(input)?;
            let published_only = visible_only(ctx, filter.and_then(|f| f.published_only));
            reply(repo.list(published_only).await?)
        }
        "getById" => {
            let IdInput { id } = parse(input)?;
            reply(visible(ctx, repo.get_by_id(id).await?))
        }
        "getBySlug" => {
            let SlugInput { slug } = parse(input)?;
            reply(visible(ctx, repo.get_by_slug(&slug).await?))
        }
        "getFeatured" => {
            let LimitInput { limit } = parse::<Option<LimitInput>>(input)?.unwrap_or_default();
            reply(repo.featured(limit.unwrap_or(DEFAULT_FEATURED_LIMIT)).await?)
        }
        "create" => {
            ctx.require_admin()?;
            let fields: RouteCreate = parse(input)?;
            created(repo.create(fields).await?)
        }
        "update" => {
            ctx.require_admin()?;
            let (id, rest) = split_id(input)?;
            let patch: RoutePatch = parse(rest)?;
            success(repo.update(id, patch).await?)
        }
        "delete" => {
            ctx.require_admin()?;
            let IdInput { id } = parse(input)?;
            success(repo.delete(id).await?)
        }
        _ => Err(no_such_method()),
    }
}
