use chrono::Utc;
use serde::Deserialize;

use super::{require_patch_text, require_text};
use crate::db::models::HeroSection;
use crate::db::patch::{FieldBag, Patch};
use crate::db::sql::{delete_row, insert_row, update_row};
use crate::db::store::SqlitePool;
use crate::error::KaptanError;

const TABLE: &str = "hero_sections";
const COLUMNS: &str = "id, title, subtitle, background_image, primary_button_text, \
                       primary_button_link, secondary_button_text, secondary_button_link, \
                       is_active, sort_order, created_at, updated_at";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroSectionCreate {
    pub title: String,
    pub subtitle: Option<String>,
    pub background_image: Option<String>,
    pub primary_button_text: Option<String>,
    pub primary_button_link: Option<String>,
    pub secondary_button_text: Option<String>,
    pub secondary_button_link: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroSectionPatch {
    pub title: Option<String>,
    pub subtitle: Patch<String>,
    pub background_image: Patch<String>,
    pub primary_button_text: Patch<String>,
    pub primary_button_link: Patch<String>,
    pub secondary_button_text: Patch<String>,
    pub secondary_button_link: Patch<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i64>,
}

impl HeroSectionCreate {
    fn into_fields(self) -> Result<FieldBag, KaptanError> {
        require_text("title", &self.title)?;
        Ok(FieldBag::new()
            .set("title", Patch::Value(self.title))
            .opt("subtitle", self.subtitle)
            .opt("background_image", self.background_image)
            .opt("primary_button_text", self.primary_button_text)
            .opt("primary_button_link", self.primary_button_link)
            .opt("secondary_button_text", self.secondary_button_text)
            .opt("secondary_button_link", self.secondary_button_link)
            .opt("is_active", self.is_active)
            .opt("sort_order", self.sort_order))
    }
}

impl HeroSectionPatch {
    fn into_fields(self) -> Result<FieldBag, KaptanError> {
        require_patch_text("title", &self.title)?;
        Ok(FieldBag::new()
            .opt("title", self.title)
            .set("subtitle", self.subtitle)
            .set("background_image", self.background_image)
            .set("primary_button_text", self.primary_button_text)
            .set("primary_button_link", self.primary_button_link)
            .set("secondary_button_text", self.secondary_button_text)
            .set("secondary_button_link", self.secondary_button_link)
            .opt("is_active", self.is_active)
            .opt("sort_order", self.sort_order))
    }
}

pub struct HeroSectionRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> HeroSectionRepo<'a> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, active_only: bool) -> Result<Vec<HeroSection>, KaptanError> {
        let rows = sqlx::query_as::<_, HeroSection>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE (? = 0 OR is_active = 1) \
             ORDER BY sort_order ASC, id ASC"
        ))
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// The hero shown on the homepage: first active one by sort order.
    pub async fn active(&self) -> Result<Option<HeroSection>, KaptanError> {
        let row = sqlx::query_as::<_, HeroSection>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE is_active = 1 \
             ORDER BY sort_order ASC, id ASC LIMIT 1"
        ))
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<HeroSection>, KaptanError> {
        let row = sqlx::query_as::<_, HeroSection>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    pub async fn create(&self, input: HeroSectionCreate) -> Result<i64, KaptanError> {
        let fields = input.into_fields()?;
        let mut conn = self.pool.acquire().await?;
        insert_row(&mut conn, TABLE, fields.present(), Utc::now()).await
    }

    pub async fn update(&self, id: i64, patch: HeroSectionPatch) -> Result<bool, KaptanError> {
        let fields = patch.into_fields()?;
        let mut conn = self.pool.acquire().await?;
        update_row(&mut conn, TABLE, id, fields.present(), Utc::now()).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, KaptanError> {
        let mut conn = self.pool.acquire().await?;
        delete_row(&mut conn, TABLE, id).await
    }
}
