use serde_json::Value;

use super::{
    ActiveFilter, IdInput, SlugInput, created, no_such_method, parse, reply, split_id, success,
    visible_only,
};
use crate::db::models::Category;
use crate::db::repos::{CategoryCreate, CategoryPatch};
use crate::error::KaptanError;
use crate::middleware::AccessContext;
use crate::router::KaptanState;

fn visible(ctx: &AccessContext, row: Option<Category>) -> Option<Category> {
    row.filter(|c| ctx.is_admin() || c.is_active)
}

pub(super) async fn call(
    state: &KaptanState,
    ctx: &AccessContext,
    method: &str,
    input: Value,
) -> Result<Value, KaptanError> {
    let repo = state.store.categories();
    match method {
        "list" => {
            let filter: Option<ActiveFilter> = parse(input)?;
            let active_only = visible_only(ctx, filter.and_then(|f| f.active_only));
            reply(repo.list(active_only).await?)
        }
        "getById" => {
            let IdInput { id } = parse(input)?;
            reply(visible(ctx, repo.get_by_id(id).await?))
        }
        "getBySlug" => {
            let SlugInput { slug } = parse(input)?;
            reply(visible(ctx, repo.get_by_slug(&slug).await?))
        }
        "create" => {
            ctx.require_admin()?;
            let fields: CategoryCreate = parse(input)?;
            created(repo.create(fields).await?)
        }
        "update" => {
            ctx.require_admin()?;
            let (id, rest) = split_id(input)?;
            let patch: CategoryPatch = parse(rest)?;
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
