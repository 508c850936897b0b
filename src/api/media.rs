use serde_json::Value;

use super::{IdInput, LimitInput, no_such_method, parse, reply, success};
use crate::error::KaptanError;
use crate::middleware::AccessContext;
use crate::router::KaptanState;
use crate::service::media::{self, MediaUpload};

pub(super) async fn call(
    state: &KaptanState,
    ctx: &AccessContext,
    method: &str,
    input: Value,
) -> Result<Value, KaptanError> {
    match method {
        "list" => {
            let LimitInput { limit } = parse::<Option<LimitInput>>(input)?.unwrap_or_default();
            let limit = limit.unwrap_or(state.media_list_limit);
            reply(state.store.media().list(limit).await?)
        }
        "getById" => {
            let IdInput { id } = parse(input)?;
            reply(state.store.media().get_by_id(id).await?)
        }
        "upload" => {
            let user = ctx.require_admin()?;
            let upload: MediaUpload = parse(input)?;
            reply(media::upload(&state.store, state.objects.as_ref(), upload, Some(user.id)).await?)
        }
        "delete" => {
            ctx.require_admin()?;
            let IdInput { id } = parse(input)?;
            success(media::delete(&state.store, state.objects.as_ref(), id).await?)
        }
        _ => Err(no_such_method()),
    }
}
