use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{require_patch_text, require_text};
use crate::db::models::Post;
use crate::db::patch::{FieldBag, Patch};
use crate::db::sql::{delete_row, fmt_ts, insert_row, update_row};
use crate::db::store::SqlitePool;
use crate::error::KaptanError;

const TABLE: &str = "posts";
const COLUMNS: &str = "id, title, slug, excerpt, content, featured_image, author_name, \
                       author_title, author_image, category_id, read_time, view_count, \
                       is_published, is_featured, meta_title, meta_description, published_at, \
                       created_at, updated_at";
/// Drafts have no publish date yet; they sort by creation instead.
const RECENCY: &str = "ORDER BY COALESCE(published_at, created_at) DESC, id DESC";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCreate {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub featured_image: Option<String>,
    pub author_name: Option<String>,
    pub author_title: Option<String>,
    pub author_image: Option<String>,
    pub category_id: Option<i64>,
    pub read_time: Option<i64>,
    pub is_published: Option<bool>,
    pub is_featured: Option<bool>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Patch<String>,
    pub content: Patch<String>,
    pub featured_image: Patch<String>,
    pub author_name: Patch<String>,
    pub author_title: Patch<String>,
    pub author_image: Patch<String>,
    pub category_id: Patch<i64>,
    pub read_time: Option<i64>,
    pub is_published: Option<bool>,
    pub is_featured: Option<bool>,
    pub meta_title: Patch<String>,
    pub meta_description: Patch<String>,
    pub published_at: Patch<DateTime<Utc>>,
}

impl PostCreate {
    fn into_fields(self, now: DateTime<Utc>) -> Result<FieldBag, KaptanError> {
        require_text("title", &self.title)?;
        require_text("slug", &self.slug)?;
        // a post published on creation gets a publish date so it sorts by it
        let published_at = match (self.published_at, self.is_published) {
            (Some(at), _) => Some(at),
            (None, Some(true)) => Some(now),
            (None, _) => None,
        };
        Ok(FieldBag::new()
            .set("title", Patch::Value(self.title))
            .set("slug", Patch::Value(self.slug))
            .opt("excerpt", self.excerpt)
            .opt("content", self.content)
            .opt("featured_image", self.featured_image)
            .opt("author_name", self.author_name)
            .opt("author_title", self.author_title)
            .opt("author_image", self.author_image)
            .opt("category_id", self.category_id)
            .opt("read_time", self.read_time)
            .opt("is_published", self.is_published)
            .opt("is_featured", self.is_featured)
            .opt("meta_title", self.meta_title)
            .opt("meta_description", self.meta_description)
            .opt("published_at", published_at))
    }
}

impl PostPatch {
    /// Publishing without an explicit date stamps one, unless the post
    /// already has it.
    fn stamps_publish_date(&self) -> bool {
        self.is_published == Some(true) && self.published_at.is_absent()
    }

    fn into_fields(self) -> Result<FieldBag, KaptanError> {
        require_patch_text("title", &self.title)?;
        require_patch_text("slug", &self.slug)?;
        Ok(FieldBag::new()
            .opt("title", self.title)
            .opt("slug", self.slug)
            .set("excerpt", self.excerpt)
            .set("content", self.content)
            .set("featured_image", self.featured_image)
            .set("author_name", self.author_name)
            .set("author_title", self.author_title)
            .set("author_image", self.author_image)
            .set("category_id", self.category_id)
            .opt("read_time", self.read_time)
            .opt("is_published", self.is_published)
            .opt("is_featured", self.is_featured)
            .set("meta_title", self.meta_title)
            .set("meta_description", self.meta_description)
            .set("published_at", self.published_at))
    }
}

pub struct PostRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PostRepo<'a> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Newest first. `limit = None` returns every matching post.
    pub async fn list(
        &self,
        published_only: bool,
        limit: Option<u32>,
    ) -> Result<Vec<Post>, KaptanError> {
        let rows = sqlx::query_as::<_, Post>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE (? = 0 OR is_published = 1) {RECENCY} LIMIT ?"
        ))
        .bind(published_only)
        .bind(limit.map_or(-1, i64::from))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Post>, KaptanError> {
        let row = sqlx::query_as::<_, Post>(&format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>, KaptanError> {
        let row =
            sqlx::query_as::<_, Post>(&format!("SELECT {COLUMNS} FROM {TABLE} WHERE slug = ?"))
                .bind(slug)
                .fetch_optional(self.pool)
                .await?;
        Ok(row)
    }

    pub async fn get_by_category(
        &self,
        category_id: i64,
        published_only: bool,
    ) -> Result<Vec<Post>, KaptanError> {
        let rows = sqlx::query_as::<_, Post>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE category_id = ? \
             AND (? = 0 OR is_published = 1) {RECENCY}"
        ))
        .bind(category_id)
        .bind(published_only)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Featured posts; only published ones qualify.
    pub async fn featured(&self, limit: u32) -> Result<Vec<Post>, KaptanError> {
        let rows = sqlx::query_as::<_, Post>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE is_featured = 1 AND is_published = 1 \
             {RECENCY} LIMIT ?"
        ))
        .bind(i64::from(limit))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Atomic `+1`; does not touch `updated_at`.
    pub async fn increment_view_count(&self, id: i64) -> Result<(), KaptanError> {
        sqlx::query("UPDATE posts SET view_count = view_count + 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    pub async fn create(&self, input: PostCreate) -> Result<i64, KaptanError> {
        let now = Utc::now();
        let fields = input.into_fields(now)?;
        let mut conn = self.pool.acquire().await?;
        insert_row(&mut conn, TABLE, fields.present(), now).await
    }

    pub async fn update(&self, id: i64, patch: PostPatch) -> Result<bool, KaptanError> {
        let now = Utc::now();
        let stamp = patch.stamps_publish_date();
        let fields = patch.into_fields()?;
        let mut tx = self.pool.begin().await?;
        let matched = update_row(&mut tx, TABLE, id, fields.present(), now).await?;
        if matched && stamp {
            sqlx::query("UPDATE posts SET published_at = ? WHERE id = ? AND published_at IS NULL")
                .bind(fmt_ts(now))
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(matched)
    }

    pub async fn delete(&self, id: i64) -> Result<bool, KaptanError> {
        let mut conn = self.pool.acquire().await?;
        delete_row(&mut conn, TABLE, id).await
    }
}
