use serde::Deserialize;
use serde_json::Value;

use super::{
    DEFAULT_FEATURED_LIMIT, IdInput, LimitInput, SlugInput, created, no_such_method, parse, reply,
    split_id, success, visible_only,
};
use crate::db::models::Post;
use crate::db::repos::{PostCreate, PostPatch};
use crate::error::KaptanError;
use crate::middleware::AccessContext;
use crate::router::KaptanState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListInput {
    published_only: Option<bool>,
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ByCategoryInput {
    category_id: i64,
    published_only: Option<bool>,
}

fn visible(ctx: &AccessContext, row: Option<Post>) -> Option<Post> {
    row.filter(|p| ctx.is_admin() || p.is_published)
}

pub(super) async fn call(
    state: &KaptanState,
    ctx: &AccessContext,
    method: &str,
    input: Value,
) -> Result<Value, KaptanError> {
    let repo = state.store.posts();
    match method {
        "list" => {
            let filter: ListInput = parse::<Option<ListInput>>(input)?.unwrap_or_default();
            let published_only = visible_only(ctx, filter.published_only);
            reply(repo.list(published_only, filter.limit).await?)
        }
        "getById" => {
            let IdInput { id } = parse(input)?;
            reply(visible(ctx, repo.get_by_id(id).await?))
        }
        "getBySlug" => {
            let SlugInput { slug } = parse(input)?;
            let post = visible(ctx, repo.get_by_slug(&slug).await?);
            if let Some(p) = post.as_ref() {
                repo.increment_view_count(p.id).await?;
            }
            reply(post)
        }
        "getByCategory" => {
            let filter: ByCategoryInput = parse(input)?;
            let published_only = visible_only(ctx, filter.published_only);
            reply(repo.get_by_category(filter.category_id, published_only).await?)
        }
        "getFeatured" => {
            let LimitInput { limit } = parse::<Option<LimitInput>>(input)?.unwrap_or_default();
            reply(repo.featured(limit.unwrap_or(DEFAULT_FEATURED_LIMIT)).await?)
        }
        "create" => {
            ctx.require_admin()?;
            let fields: PostCreate = parse(input)?;
            created(repo.create(fields).await?)
        }
        "update" => {
            ctx.require_admin()?;
            let (id, rest) = split_id(input)?;
            let patch: PostPatch = parse(rest)?;
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
