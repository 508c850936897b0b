use serde_json::Value;

use super::{no_such_method, reply, success};
use crate::error::KaptanError;
use crate::middleware::AccessContext;

/// `auth.logout` only reports success here; the HTTP layer clears the cookie.
pub(super) async fn call(ctx: &AccessContext, method: &str) -> Result<Value, KaptanError> {
    match method {
        "me" => reply(ctx.user.as_ref()),
        "logout" => success(true),
        _ => Err(no_such_method()),
    }
}
