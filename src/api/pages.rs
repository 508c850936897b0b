use serde_json::Value;

use super::{
    IdInput, PublishedFilter, SlugInput, created, no_such_method, parse, reply, split_id, success,
    visible_only,
};
use crate::db::models::Page;
use crate::db::repos::{PageCreate, PagePatch};
use crate::error::KaptanError;
use crate::middleware::AccessContext;
use crate::router::KaptanState;

fn visible(ctx: &AccessContext, row: Option<Page>) -> Option<Page> {
    row.filter(|p| ctx.is_admin() || p.is_published)
}

pub(super) async fn call(
    state: &KaptanState,
    ctx: &AccessContext,
    method: &str,
    input: Value,
) -> Result<Value, KaptanError> {
    let repo = state.store.pages();
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
        "create" => {
            ctx.require_admin()?;
            let fields: PageCreate = parse(input)?;
            created(repo.create(fields).await?)
        }
        "update" => {
            ctx.require_admin()?;
            let (id, rest) = split_id(input)?;
            let patch: PagePatch = parse(rest)?;
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
