use chrono::Utc;
use serde::Deserialize;

use super::{require_patch_text, require_text};
use crate::db::models::Page;
use crate::db::patch::{FieldBag, Patch};
use crate::db::sql::{delete_row, insert_row, update_row};
use crate::db::store::SqlitePool;
use crate::error::KaptanError;

const TABLE: &str = "pages";
const COLUMNS: &str = "id, title, slug, content, featured_image, template, is_published, \
                       meta_title, meta_description, sort_order, created_at, updated_at";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCreate {
    pub title: String,
    pub slug: String,
    pub content: Option<String>,
    pub featured_image: Option<String>,
    pub template: Option<String>,
    pub is_published: Option<bool>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PagePatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Patch<String>,
    pub featured_image: Patch<String>,
    pub template: Option<String>,
    pub is_published: Option<bool>,
    pub meta_title: Patch<String>,
    pub meta_description: Patch<String>,
    pub sort_order: Option<i64>,
}

impl PageCreate {
    fn into_fields(self) -> Result<FieldBag, KaptanError> {
        require_text("title", &self.title)?;
        require_text("slug", &self.slug)?;
        Ok(FieldBag::new()
            .set("title", Patch::Value(self.title))
            .set("slug", Patch::Value(self.slug))
            .opt("content", self.content)
            .opt("featured_image", self.featured_image)
            .opt("template", self.template.filter(|t| !t.trim().is_empty()))
            .opt("is_published", self.is_published)
            .opt("meta_title", self.meta_title)
            .opt("meta_description", self.meta_description)
            .opt("sort_order", self.sort_order))
    }
}

impl PagePatch {
    fn into_fields(self) -> Result<FieldBag, KaptanError> {
        require_patch_text("title", &self.title)?;
        require_patch_text("slug", &self.slug)?;
        require_patch_text("template", &self.template)?;
        Ok(FieldBag::new()
            .opt("title", self.title)
            .opt("slug", self.slug)
            .set("content", self.content)
            .set("featured_image", self.featured_image)
            .opt("template", self.template)
            .opt("is_published", self.is_published)
            .set("meta_title", self.meta_title)
            .set("meta_description", self.meta_description)
            .opt("sort_order", self.sort_order))
    }
}

pub struct PageRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PageRepo<'a> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, published_only: bool) -> Result<Vec<Page>, KaptanError> {
        let rows = sqlx::query_as::<_, Page>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE (? = 0 OR is_published = 1) \
             ORDER BY sort_order ASC, id ASC"
        ))
        .bind(published_only)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Page>, KaptanError> {
        let row = sqlx::query_as::<_, Page>(&format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Page>, KaptanError> {
        let row =
            sqlx::query_as::<_, Page>(&format!("SELECT {COLUMNS} FROM {TABLE} WHERE slug = ?"))
                .bind(slug)
                .fetch_optional(self.pool)
                .await?;
        Ok(row)
    }

    pub async fn create(&self, input: PageCreate) -> Result<i64, KaptanError> {
        let fields = input.into_fields()?;
        let mut conn = self.pool.acquire().await?;
        insert_row(&mut conn, TABLE, fields.present(), Utc::now()).await
    }

    pub async fn update(&self, id: i64, patch: PagePatch) -> Result<bool, KaptanError> {
        let fields = patch.into_fields()?;
        let mut conn = self.pool.acquire().await?;
        update_row(&mut conn, TABLE, id, fields.present(), Utc::now()).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, KaptanError> {
        let mut conn = self.pool.acquire().await?;
        delete_row(&mut conn, TABLE, id).await
    }
}
