use chrono::Utc;
use serde::Deserialize;

use super::{require_patch_text, require_text};
use crate::db::models::Category;
use crate::db::patch::{FieldBag, Patch};
use crate::db::sql::{delete_row, insert_row, update_row};
use crate::db::store::SqlitePool;
use crate::error::KaptanError;

const TABLE: &str = "categories";
const COLUMNS: &str = "id, name, slug, description, icon, color, sort_order, is_active, \
                       created_at, updated_at";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCreate {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub sort_order: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Patch<String>,
    pub icon: Patch<String>,
    pub color: Patch<String>,
    pub sort_order: Option<i64>,
    pub is_active: Option<bool>,
}

impl CategoryCreate {
    fn into_fields(self) -> Result<FieldBag, KaptanError> {
        require_text("name", &self.name)?;
        require_text("slug", &self.slug)?;
        Ok(FieldBag::new()
            .set("name", Patch::Value(self.name))
            .set("slug", Patch::Value(self.slug))
            .opt("description", self.description)
            .opt("icon", self.icon)
            .opt("color", self.color)
            .opt("sort_order", self.sort_order)
            .opt("is_active", self.is_active))
    }
}

impl CategoryPatch {
    fn into_fields(self) -> Result<FieldBag, KaptanError> {
        require_patch_text("name", &self.name)?;
        require_patch_text("slug", &self.slug)?;
        Ok(FieldBag::new()
            .opt("name", self.name)
            .opt("slug", self.slug)
            .set("description", self.description)
            .set("icon", self.icon)
            .set("color", self.color)
            .opt("sort_order", self.sort_order)
            .opt("is_active", self.is_active))
    }
}

pub struct CategoryRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CategoryRepo<'a> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, active_only: bool) -> Result<Vec<Category>, KaptanError> {
        let rows = sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE (? = 0 OR is_active = 1) \
             ORDER BY sort_order ASC, id ASC"
        ))
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Category>, KaptanError> {
        let row = sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, KaptanError> {
        let row = sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE slug = ?"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    pub async fn create(&self, input: CategoryCreate) -> Result<i64, KaptanError> {
        let fields = input.into_fields()?;
        let mut conn = self.pool.acquire().await?;
        insert_row(&mut conn, TABLE, fields.present(), Utc::now()).await
    }

    pub async fn update(&self, id: i64, patch: CategoryPatch) -> Result<bool, KaptanError> {
        let fields = patch.into_fields()?;
        let mut conn = self.pool.acquire().await?;
        update_row(&mut conn, TABLE, id, fields.present(), Utc::now()).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, KaptanError> {
        let mut conn = self.pool.acquire().await?;
        delete_row(&mut conn, TABLE, id).await
    }
}
