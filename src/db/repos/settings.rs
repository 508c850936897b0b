use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::db::merge::{MergeRules, UpsertPlan, plan_upsert};
use crate::db::models::{SettingType, SiteSetting};
use crate::db::patch::{FieldBag, Patch};
use crate::db::sql::execute_upsert;
use crate::db::store::SqlitePool;
use crate::error::KaptanError;

const TABLE: &str = "site_settings";
const COLUMNS: &str = r#"id, key, value, type, "group", label, description, created_at, updated_at"#;

const RULES: MergeRules<'static> = MergeRules {
    key_column: "key",
    generated: &[],
    touch: "updated_at",
    privilege: None,
};

/// One setting write. Only `key` is required; omitted fields keep their
/// stored value on update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingInput {
    pub key: Option<String>,
    pub value: Patch<String>,
    #[serde(rename = "type")]
    pub setting_type: Option<SettingType>,
    pub group: Patch<String>,
    pub label: Patch<String>,
    pub description: Patch<String>,
}

impl SettingInput {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: Patch::Value(value.into()),
            ..Self::default()
        }
    }

    fn plan(self, now: DateTime<Utc>) -> Result<UpsertPlan, KaptanError> {
        let fields = FieldBag::new()
            .set("value", self.value)
            .opt("type", self.setting_type.map(SettingType::as_str))
            .set("\"group\"", self.group)
            .set("label", self.label)
            .set("description", self.description);
        plan_upsert(self.key.as_deref(), &fields, &RULES, now)
    }
}

pub struct SettingRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SettingRepo<'a> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn all(&self) -> Result<Vec<SiteSetting>, KaptanError> {
        let rows = sqlx::query_as::<_, SiteSetting>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} ORDER BY key ASC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn by_group(&self, group: &str) -> Result<Vec<SiteSetting>, KaptanError> {
        let rows = sqlx::query_as::<_, SiteSetting>(&format!(
            r#"SELECT {COLUMNS} FROM {TABLE} WHERE "group" = ? ORDER BY key ASC"#
        ))
        .bind(group)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn by_key(&self, key: &str) -> Result<Option<SiteSetting>, KaptanError> {
        let row = sqlx::query_as::<_, SiteSetting>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE key = ?"
        ))
        .bind(key)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Create or update by key. Returns the row id.
    pub async fn upsert(&self, input: SettingInput) -> Result<i64, KaptanError> {
        let now = Utc::now();
        let plan = input.plan(now)?;
        let mut conn = self.pool.acquire().await?;
        execute_upsert(&mut conn, TABLE, plan, now).await
    }

    /// All-or-nothing: every input is validated before the transaction opens,
    /// and any failed write rolls the whole batch back.
    pub async fn bulk_upsert(&self, inputs: Vec<SettingInput>) -> Result<Vec<i64>, KaptanError> {
        let now = Utc::now();
        let plans = inputs
            .into_iter()
            .map(|input| input.plan(now))
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(plans.len());
        for plan in plans {
            ids.push(execute_upsert(&mut tx, TABLE, plan, now).await?);
        }
        tx.commit().await?;
        Ok(ids)
    }

    pub async fn delete(&self, key: &str) -> Result<bool, KaptanError> {
        let res = sqlx::query("DELETE FROM site_settings WHERE key = ?")
            .bind(key)
            .execute(self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::patch::SqlValue;

    #[test]
    fn only_key_is_required() {
        let input: SettingInput = serde_json::from_str(r#"{"key":"site_name"}"#).expect("parse");
        let plan = input.plan(Utc::now()).expect("plan");
        assert_eq!(plan.key, "site_name");
        assert_eq!(plan.update_set.keys().copied().collect::<Vec<_>>(), vec!["updated_at"]);
    }

    #[test]
    fn missing_key_is_rejected() {
        let input: SettingInput = serde_json::from_str(r#"{"value":"x"}"#).expect("parse");
        assert!(matches!(input.plan(Utc::now()), Err(KaptanError::Validation(_))));
    }

    #[test]
    fn null_value_clears_and_group_is_quoted() {
        let input: SettingInput =
            serde_json::from_str(r#"{"key":"tagline","value":null,"group":"general","type":"textarea"}"#)
                .expect("parse");
        let plan = input.plan(Utc::now()).expect("plan");
        assert_eq!(plan.update_set.get("value"), Some(&SqlValue::Null));
        assert_eq!(plan.update_set.get("\"group\""), Some(&SqlValue::from("general")));
        assert_eq!(plan.insert_values.get("type"), Some(&SqlValue::from("textarea")));
    }
}
