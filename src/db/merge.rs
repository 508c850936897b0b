//! Create-or-update planning by natural key.
//!
//! [`plan_upsert`] turns a partial [`FieldBag`] into the exact column set
//! written when the key is new (`insert_values`) and when it already exists
//! (`update_set`). Absent fields never reach either map, so an update can only
//! change what the caller actually supplied.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::patch::{FieldBag, Patch, SqlValue};
use crate::auth::OwnerPolicy;
use crate::error::KaptanError;

pub type FieldMap = BTreeMap<&'static str, SqlValue>;

/// Forces `column = elevated` for owner identities that did not pick a value.
#[derive(Debug, Clone)]
pub struct PrivilegeRule<'a> {
    pub column: &'static str,
    pub elevated: SqlValue,
    pub policy: &'a OwnerPolicy,
}

#[derive(Debug, Clone)]
pub struct MergeRules<'a> {
    pub key_column: &'static str,
    /// Columns defaulted to `now` in both maps when the caller left them absent.
    pub generated: &'a [&'static str],
    /// Column forced into an otherwise empty update set.
    pub touch: &'static str,
    pub privilege: Option<PrivilegeRule<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpsertPlan {
    pub key_column: &'static str,
    pub key: String,
    pub insert_values: FieldMap,
    pub update_set: FieldMap,
}

pub fn plan_upsert(
    key: Option<&str>,
    fields: &FieldBag,
    rules: &MergeRules<'_>,
    now: DateTime<Utc>,
) -> Result<UpsertPlan, KaptanError> {
    let key = key
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| KaptanError::validation(format!("{} is required", rules.key_column)))?;

    let mut insert_values = FieldMap::new();
    let mut update_set = FieldMap::new();

    for (column, patch) in fields.iter() {
        if column == rules.key_column {
            continue;
        }
        let value = match patch {
            Patch::Absent => continue,
            Patch::Null => SqlValue::Null,
            Patch::Value(v) => v.clone(),
        };
        insert_values.insert(column, value.clone());
        update_set.insert(column, value);
    }

    if let Some(rule) = rules.privilege.as_ref()
        && fields.get(rule.column).is_absent()
        && rule.policy.is_owner_identity(key)
    {
        insert_values.insert(rule.column, rule.elevated.clone());
        update_set.insert(rule.column, rule.elevated.clone());
    }

    for &column in rules.generated {
        if fields.get(column).is_absent() {
            insert_values.insert(column, SqlValue::Timestamp(now));
            update_set.insert(column, SqlValue::Timestamp(now));
        }
    }

    if update_set.is_empty() {
        update_set.insert(rules.touch, SqlValue::Timestamp(now));
    }

    insert_values.insert(rules.key_column, SqlValue::Text(key.to_string()));

    Ok(UpsertPlan {
        key_column: rules.key_column,
        key: key.to_string(),
        insert_values,
        update_set,
    })
}
