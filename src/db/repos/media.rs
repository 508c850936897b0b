use chrono::Utc;

use crate::db::models::Media;
use crate::db::patch::{FieldBag, Patch};
use crate::db::sql::insert_row;
use crate::db::store::SqlitePool;
use crate::error::KaptanError;

const TABLE: &str = "media";
const COLUMNS: &str = "id, filename, original_name, mime_type, size, url, storage_key, alt, \
                       caption, uploaded_by, created_at";

/// Metadata for an object that is already in the object store.
#[derive(Debug, Clone, Default)]
pub struct MediaCreate {
    pub filename: String,
    pub original_name: Option<String>,
    pub mime_type: Option<String>,
    pub size: Option<i64>,
    pub url: String,
    pub storage_key: Option<String>,
    pub alt: Option<String>,
    pub caption: Option<String>,
    pub uploaded_by: Option<i64>,
}

impl MediaCreate {
    fn into_fields(self) -> FieldBag {
        FieldBag::new()
            .set("filename", Patch::Value(self.filename))
            .opt("original_name", self.original_name)
            .opt("mime_type", self.mime_type)
            .opt("size", self.size)
            .set("url", Patch::Value(self.url))
            .opt("storage_key", self.storage_key)
            .opt("alt", self.alt)
            .opt("caption", self.caption)
            .opt("uploaded_by", self.uploaded_by)
    }
}

pub struct MediaRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MediaRepo<'a> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, limit: u32) -> Result<Vec<Media>, KaptanError> {
        let rows = sqlx::query_as::<_, Media>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(i64::from(limit))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Media>, KaptanError> {
        let row = sqlx::query_as::<_, Media>(&format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    pub async fn create(&self, input: MediaCreate) -> Result<i64, KaptanError> {
        let fields = input.into_fields();
        let mut conn = self.pool.acquire().await?;
        insert_row(&mut conn, TABLE, fields.present(), Utc::now()).await
    }

    /// Removes the row and hands it back so the caller can clean up the
    /// stored object. `None` when no row matched.
    pub async fn delete(&self, id: i64) -> Result<Option<Media>, KaptanError> {
        let row = sqlx::query_as::<_, Media>(&format!(
            "DELETE FROM {TABLE} WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }
}
