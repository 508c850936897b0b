use chrono::{DateTime, Utc};

use crate::auth::OwnerPolicy;
use crate::db::merge::{MergeRules, PrivilegeRule, UpsertPlan, plan_upsert};
use crate::db::models::{Role, User};
use crate::db::patch::{FieldBag, Patch, SqlValue};
use crate::db::sql::execute_upsert;
use crate::db::store::SqlitePool;
use crate::error::KaptanError;

const TABLE: &str = "users";
const COLUMNS: &str = "id, open_id, name, email, login_method, role, created_at, updated_at, \
                       last_signed_in";

/// Sign-in bookkeeping for one identity. Fields left `Absent` keep their
/// stored value.
#[derive(Debug, Clone, Default)]
pub struct UserUpsert {
    pub open_id: String,
    pub name: Patch<String>,
    pub email: Patch<String>,
    pub login_method: Patch<String>,
    pub role: Option<Role>,
    pub last_signed_in: Option<DateTime<Utc>>,
}

impl UserUpsert {
    pub fn new(open_id: impl Into<String>) -> Self {
        Self {
            open_id: open_id.into(),
            ..Self::default()
        }
    }

    fn plan(self, owner: &OwnerPolicy, now: DateTime<Utc>) -> Result<UpsertPlan, KaptanError> {
        let fields = FieldBag::new()
            .set("name", self.name)
            .set("email", self.email)
            .set("login_method", self.login_method)
            .opt("role", self.role.map(Role::as_str))
            .opt("last_signed_in", self.last_signed_in);
        let rules = MergeRules {
            key_column: "open_id",
            generated: &["last_signed_in"],
            touch: "last_signed_in",
            privilege: Some(PrivilegeRule {
                column: "role",
                elevated: SqlValue::from(Role::Admin.as_str()),
                policy: owner,
            }),
        };
        plan_upsert(Some(self.open_id.as_str()), &fields, &rules, now)
    }
}

pub struct UserRepo<'a> {
    pool: &'a SqlitePool,
    owner: &'a OwnerPolicy,
}

impl<'a> UserRepo<'a> {
    pub(crate) fn new(pool: &'a SqlitePool, owner: &'a OwnerPolicy) -> Self {
        Self { pool, owner }
    }

    /// Insert or merge by `open_id`. Returns the row id.
    pub async fn upsert(&self, input: UserUpsert) -> Result<i64, KaptanError> {
        let now = Utc::now();
        let plan = input.plan(self.owner, now)?;
        let mut conn = self.pool.acquire().await?;
        execute_upsert(&mut conn, TABLE, plan, now).await
    }

    pub async fn get_by_open_id(&self, open_id: &str) -> Result<Option<User>, KaptanError> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE open_id = ?"
        ))
        .bind(open_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, KaptanError> {
        let row = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_open_id_is_rejected() {
        let owner = OwnerPolicy::default();
        let err = UserUpsert::new("  ").plan(&owner, Utc::now()).unwrap_err();
        assert!(matches!(err, KaptanError::Validation(_)));
    }

    #[test]
    fn bare_sign_in_only_touches_last_signed_in() {
        let owner = OwnerPolicy::new("owner");
        let now = Utc::now();
        let plan = UserUpsert::new("guest").plan(&owner, now).expect("plan");
        assert_eq!(
            plan.update_set.into_iter().collect::<Vec<_>>(),
            vec![("last_signed_in", SqlValue::Timestamp(now))]
        );
    }

    #[test]
    fn owner_sign_in_is_elevated() {
        let owner = OwnerPolicy::new("owner");
        let plan = UserUpsert::new("owner").plan(&owner, Utc::now()).expect("plan");
        assert_eq!(plan.insert_values.get("role"), Some(&SqlValue::from("admin")));
    }
}
