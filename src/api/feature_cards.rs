use serde_json::Value;

use super::{
    ActiveFilter, IdInput, created, no_such_method, parse, reply, split_id, success, visible_only,
};
use crate::db::repos::{FeatureCardCreate, FeatureCardPatch};
use crate::error::KaptanError;
use crate::middleware::AccessContext;
use crate::router::KaptanState;

pub(super) async fn call(
    state: &KaptanState,
    ctx: &AccessContext,
    method: &str,
    input: Value,
) -> Result<Value, KaptanError> {
    let repo = state.store.feature_cards();
    match method {
        "list" => {
            let filter: Option<ActiveFilter> = parse(input)?;
            let active_only = visible_only(ctx, filter.and_then(|f| f.active_only));
            reply(repo.list(active_only).await?)
        }
        "getById" => {
            let IdInput { id } = parse(input)?;
            let card = repo.get_by_id(id).await?;
            reply(card.filter(|c| ctx.is_admin() || c.is_active))
        }
        "create" => {
            ctx.require_admin()?;
            let fields: FeatureCardCreate = parse(input)?;
            created(repo.create(fields).await?)
        }
        "update" => {
            ctx.require_admin()?;
            let (id, rest) = split_id(input)?;
            let patch: FeatureCardPatch = parse(rest)?;
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
