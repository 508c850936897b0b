//! Dynamic statement builders for partial writes.
//!
//! Column and table names always come from code, never from request input;
//! only values are bound.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::merge::UpsertPlan;
use super::patch::SqlValue;
use crate::error::KaptanError;

/// Fixed-width RFC3339 so that text ordering matches time ordering.
pub fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn push_value(qb: &mut QueryBuilder<'_, Sqlite>, value: SqlValue) {
    match value {
        SqlValue::Null => qb.push_bind(Option::<String>::None),
        SqlValue::Text(s) => qb.push_bind(s),
        SqlValue::Int(i) => qb.push_bind(i),
        SqlValue::Bool(b) => qb.push_bind(b),
        SqlValue::Timestamp(t) => qb.push_bind(fmt_ts(t)),
    };
}

/// `INSERT INTO <table> (...) VALUES (...)`, stamping both timestamps.
/// Returns the new row id.
pub async fn insert_row(
    conn: &mut SqliteConnection,
    table: &'static str,
    values: Vec<(&'static str, SqlValue)>,
    now: DateTime<Utc>,
) -> Result<i64, KaptanError> {
    let mut values = values;
    values.retain(|(c, _)| *c != "created_at" && *c != "updated_at");
    values.push(("created_at", SqlValue::Timestamp(now)));
    values.push(("updated_at", SqlValue::Timestamp(now)));

    let mut qb = QueryBuilder::<Sqlite>::new(format!("INSERT INTO {table} ("));
    let mut cols = qb.separated(", ");
    for (column, _) in &values {
        cols.push(*column);
    }
    qb.push(") VALUES (");
    for (i, (_, value)) in values.into_iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        push_value(&mut qb, value);
    }
    qb.push(")");

    let res = qb.build().execute(&mut *conn).await?;
    Ok(res.last_insert_rowid())
}

/// `UPDATE <table> SET ... , updated_at = now WHERE id = ?`.
/// Returns whether a row matched.
pub async fn update_row(
    conn: &mut SqliteConnection,
    table: &'static str,
    id: i64,
    values: Vec<(&'static str, SqlValue)>,
    now: DateTime<Utc>,
) -> Result<bool, KaptanError> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("UPDATE {table} SET "));
    for (column, value) in values.into_iter().filter(|(c, _)| *c != "updated_at") {
        qb.push(column).push(" = ");
        push_value(&mut qb, value);
        qb.push(", ");
    }
    qb.push("updated_at = ");
    push_value(&mut qb, SqlValue::Timestamp(now));
    qb.push(" WHERE id = ").push_bind(id);

    let res = qb.build().execute(&mut *conn).await?;
    Ok(res.rows_affected() > 0)
}

pub async fn delete_row(
    conn: &mut SqliteConnection,
    table: &'static str,
    id: i64,
) -> Result<bool, KaptanError> {
    let res = sqlx::query(&format!("DELETE FROM {table} WHERE id = ?"))
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(res.rows_affected() > 0)
}

/// Execute an [`UpsertPlan`] with `INSERT ... ON CONFLICT(<key>) DO UPDATE`.
/// Returns the row id.
pub async fn execute_upsert(
    conn: &mut SqliteConnection,
    table: &'static str,
    plan: UpsertPlan,
    now: DateTime<Utc>,
) -> Result<i64, KaptanError> {
    let UpsertPlan {
        key_column,
        key,
        insert_values,
        update_set,
    } = plan;

    let mut inserts: Vec<(&'static str, SqlValue)> = insert_values
        .into_iter()
        .filter(|(c, _)| *c != "created_at" && *c != "updated_at")
        .collect();
    inserts.push(("created_at", SqlValue::Timestamp(now)));
    inserts.push(("updated_at", SqlValue::Timestamp(now)));

    let mut qb = QueryBuilder::<Sqlite>::new(format!("INSERT INTO {table} ("));
    let mut cols = qb.separated(", ");
    for (column, _) in &inserts {
        cols.push(*column);
    }
    qb.push(") VALUES (");
    for (i, (_, value)) in inserts.into_iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        push_value(&mut qb, value);
    }
    qb.push(format!(") ON CONFLICT({key_column}) DO UPDATE SET "));

    let touches_updated_at = update_set.contains_key("updated_at");
    for (i, (column, value)) in update_set.into_iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(column).push(" = ");
        push_value(&mut qb, value);
    }
    if !touches_updated_at {
        qb.push(", updated_at = ");
        push_value(&mut qb, SqlValue::Timestamp(now));
    }

    qb.build().execute(&mut *conn).await?;

    let rec: (i64,) = sqlx::query_as(&format!("SELECT id FROM {table} WHERE {key_column} = ?"))
        .bind(key)
        .fetch_one(&mut *conn)
        .await?;
    Ok(rec.0)
}
