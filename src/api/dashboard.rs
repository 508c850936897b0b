use serde_json::Value;

use super::{no_such_method, reply};
use crate::error::KaptanError;
use crate::middleware::AccessContext;
use crate::router::KaptanState;

pub(super) async fn call(
    state: &KaptanState,
    ctx: &AccessContext,
    method: &str,
) -> Result<Value, KaptanError> {
    ctx.require_admin()?;
    match method {
        "stats" => reply(state.store.dashboard().stats().await?),
        _ => Err(no_such_method()),
    }
}
