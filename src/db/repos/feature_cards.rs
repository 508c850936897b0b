use chrono::Utc;
use serde::Deserialize;

use super::{require_patch_text, require_text};
use crate::db::models::FeatureCard;
use crate::db::patch::{FieldBag, Patch};
use crate::db::sql::{delete_row, insert_row, update_row};
use crate::db::store::SqlitePool;
use crate::error::KaptanError;

const TABLE: &str = "feature_cards";
const COLUMNS: &str = "id, title, description, icon, color, link, sort_order, is_active, \
                       created_at, updated_at";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureCardCreate {
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub link: Option<String>,
    pub sort_order: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureCardPatch {
    pub title: Option<String>,
    pub description: Patch<String>,
    pub icon: Patch<String>,
    pub color: Patch<String>,
    pub link: Patch<String>,
    pub sort_order: Option<i64>,
    pub is_active: Option<bool>,
}

impl FeatureCardCreate {
    fn into_fields(self) -> Result<FieldBag, KaptanError> {
        require_text("title", &self.title)?;
        Ok(FieldBag::new()
            .set("title", Patch::Value(self.title))
            .opt("description", self.description)
            .opt("icon", self.icon)
            .opt("color", self.color)
            .opt("link", self.link)
            .opt("sort_order", self.sort_order)
            .opt("is_active", self.is_active))
    }
}

impl FeatureCardPatch {
    fn into_fields(self) -> Result<FieldBag, KaptanError> {
        require_patch_text("title", &self.title)?;
        Ok(FieldBag::new()
            .opt("title", self.title)
            .set("description", self.description)
            .set("icon", self.icon)
            .set("color", self.color)
            .set("link", self.link)
            .opt("sort_order", self.sort_order)
            .opt("is_active", self.is_active))
    }
}

pub struct FeatureCardRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FeatureCardRepo<'a> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, active_only: bool) -> Result<Vec<FeatureCard>, KaptanError> {
        let rows = sqlx::query_as::<_, FeatureCard>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE (? = 0 OR is_active = 1) \
             ORDER BY sort_order ASC, id ASC"
        ))
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<FeatureCard>, KaptanError> {
        let row = sqlx::query_as::<_, FeatureCard>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    pub async fn create(&self, input: FeatureCardCreate) -> Result<i64, KaptanError> {
        let fields = input.into_fields()?;
        let mut conn = self.pool.acquire().await?;
        insert_row(&mut conn, TABLE, fields.present(), Utc::now()).await
    }

    pub async fn update(&self, id: i64, patch: FeatureCardPatch) -> Result<bool, KaptanError> {
        let fields = patch.into_fields()?;
        let mut conn = self.pool.acquire().await?;
        update_row(&mut conn, TABLE, id, fields.present(), Utc::now()).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, KaptanError> {
        let mut conn = self.pool.acquire().await?;
        delete_row(&mut conn, TABLE, id).await
    }
}
