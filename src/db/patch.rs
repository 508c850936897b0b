//! Partial-field values shared by every write path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// A field in a partial update: not supplied, explicitly cleared, or set.
///
/// Use with `#[serde(default)]` so a missing JSON key becomes `Absent` while
/// `null` becomes `Null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(f(v)),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.map_or(Patch::Null, Patch::Value))
    }
}

/// A column value as bound into SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Text(String),
    Int(i64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v.into())
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(v)
    }
}

/// Ordered `(column, patch)` pairs describing one write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldBag {
    fields: Vec<(&'static str, Patch<SqlValue>)>,
}

impl FieldBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field; later entries for the same column replace earlier ones.
    pub fn set<T: Into<SqlValue>>(mut self, column: &'static str, patch: Patch<T>) -> Self {
        let patch = patch.map(Into::into);
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = patch,
            None => self.fields.push((column, patch)),
        }
        self
    }

    /// Record an optional field; `None` means "not supplied".
    pub fn opt<T: Into<SqlValue>>(self, column: &'static str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set(column, Patch::Value(v)),
            None => self.set::<SqlValue>(column, Patch::Absent),
        }
    }

    /// Record a JSON-encoded column.
    pub fn set_json<T: serde::Serialize>(
        self,
        column: &'static str,
        patch: Patch<T>,
    ) -> Result<Self, serde_json::Error> {
        let encoded = match patch {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(serde_json::to_string(&v)?),
        };
        Ok(self.set(column, encoded))
    }

    pub fn get(&self, column: &str) -> &Patch<SqlValue> {
        self.fields
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, p)| p)
            .unwrap_or(&Patch::Absent)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Patch<SqlValue>)> {
        self.fields.iter().map(|(c, p)| (*c, p))
    }

    /// Columns that were actually supplied, with `Null` mapped to SQL NULL.
    pub fn present(&self) -> Vec<(&'static str, SqlValue)> {
        self.fields
            .iter()
            .filter_map(|(c, p)| match p {
                Patch::Absent => None,
                Patch::Null => Some((*c, SqlValue::Null)),
                Patch::Value(v) => Some((*c, v.clone())),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Input {
        #[serde(default)]
        name: Patch<String>,
    }

    #[test]
    fn json_distinguishes_missing_null_and_value() {
        let missing: Input = serde_json::from_str("{}").expect("parse");
        let null: Input = serde_json::from_str(r#"{"name":null}"#).expect("parse");
        let value: Input = serde_json::from_str(r#"{"name":"Yelken"}"#).expect("parse");

        assert_eq!(missing.name, Patch::Absent);
        assert_eq!(null.name, Patch::Null);
        assert_eq!(value.name, Patch::Value("Yelken".to_string()));
    }

    #[test]
    fn present_skips_absent_fields() {
        let bag = FieldBag::new()
            .set("name", Patch::Value("Yelken"))
            .set::<String>("email", Patch::Absent)
            .set::<String>("icon", Patch::Null);
        assert_eq!(
            bag.present(),
            vec![("name", SqlValue::from("Yelken")), ("icon", SqlValue::Null)]
        );
    }

    #[test]
    fn later_set_replaces_earlier() {
        let bag = FieldBag::new()
            .set("sort_order", Patch::Value(1i64))
            .set("sort_order", Patch::Value(2i64));
        assert_eq!(bag.present(), vec![("sort_order", SqlValue::Int(2))]);
    }
}
