use serde::Deserialize;
use serde_json::Value;

use super::{no_such_method, parse, reply, success};
use crate::db::repos::SettingInput;
use crate::error::KaptanError;
use crate::middleware::AccessContext;
use crate::router::KaptanState;

#[derive(Debug, Deserialize)]
struct GroupInput {
    group: String,
}

#[derive(Debug, Deserialize)]
struct KeyInput {
    key: String,
}

pub(super) async fn call(
    state: &KaptanState,
    ctx: &AccessContext,
    method: &str,
    input: Value,
) -> Result<Value, KaptanError> {
    let repo = state.store.settings();
    match method {
        "list" => reply(repo.all().await?),
        "getByGroup" => {
            let GroupInput { group } = parse(input)?;
            reply(repo.by_group(&group).await?)
        }
        "getByKey" => {
            let KeyInput { key } = parse(input)?;
            reply(repo.by_key(&key).await?)
        }
        "upsert" => {
            ctx.require_admin()?;
            let setting: SettingInput = parse(input)?;
            repo.upsert(setting).await?;
            success(true)
        }
        "bulkUpsert" => {
            ctx.require_admin()?;
            let settings: Vec<SettingInput> = parse(input)?;
            repo.bulk_upsert(settings).await?;
            success(true)
        }
        "delete" => {
            ctx.require_admin()?;
            let KeyInput { key } = parse(input)?;
            success(repo.delete(&key).await?)
        }
        _ => Err(no_such_method()),
    }
}
