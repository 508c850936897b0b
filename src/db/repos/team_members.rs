use chrono::Utc;
use serde::Deserialize;
use std::collections::BTreeMap;

use super::{require_patch_text, require_text};
use crate::db::models::TeamMember;
use crate::db::patch::{FieldBag, Patch};
use crate::db::sql::{delete_row, insert_row, update_row};
use crate::db::store::SqlitePool;
use crate::error::KaptanError;

const TABLE: &str = "team_members";
const COLUMNS: &str = "id, name, title, bio, image, email, social_links, sort_order, is_active, \
                       created_at, updated_at";

pub type SocialLinks = BTreeMap<String, String>;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberCreate {
    pub name: String,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub email: Option<String>,
    pub social_links: Option<SocialLinks>,
    pub sort_order: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamMemberPatch {
    pub name: Option<String>,
    pub title: Patch<String>,
    pub bio: Patch<String>,
    pub image: Patch<String>,
    pub email: Patch<String>,
    pub social_links: Patch<SocialLinks>,
    pub sort_order: Option<i64>,
    pub is_active: Option<bool>,
}

impl TeamMemberCreate {
    fn into_fields(self) -> Result<FieldBag, KaptanError> {
        require_text("name", &self.name)?;
        let links = self.social_links.map_or(Patch::Absent, Patch::Value);
        let bag = FieldBag::new()
            .set("name", Patch::Value(self.name))
            .opt("title", self.title)
            .opt("bio", self.bio)
            .opt("image", self.image)
            .opt("email", self.email)
            .opt("sort_order", self.sort_order)
            .opt("is_active", self.is_active)
            .set_json("social_links", links)?;
        Ok(bag)
    }
}

impl TeamMemberPatch {
    fn into_fields(self) -> Result<FieldBag, KaptanError> {
        require_patch_text("name", &self.name)?;
        let bag = FieldBag::new()
            .opt("name", self.name)
            .set("title", self.title)
            .set("bio", self.bio)
            .set("image", self.image)
            .set("email", self.email)
            .opt("sort_order", self.sort_order)
            .opt("is_active", self.is_active)
            .set_json("social_links", self.social_links)?;
        Ok(bag)
    }
}

pub struct TeamMemberRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TeamMemberRepo<'a> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, active_only: bool) -> Result<Vec<TeamMember>, KaptanError> {
        let rows = sqlx::query_as::<_, TeamMember>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE (? = 0 OR is_active = 1) \
             ORDER BY sort_order ASC, id ASC"
        ))
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<TeamMember>, KaptanError> {
        let row = sqlx::query_as::<_, TeamMember>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    pub async fn create(&self, input: TeamMemberCreate) -> Result<i64, KaptanError> {
        let fields = input.into_fields()?;
        let mut conn = self.pool.acquire().await?;
        insert_row(&mut conn, TABLE, fields.present(), Utc::now()).await
    }

    pub async fn update(&self, id: i64, patch: TeamMemberPatch) -> Result<bool, KaptanError> {
        let fields = patch.into_fields()?;
        let mut conn = self.pool.acquire().await?;
        update_row(&mut conn, TABLE, id, fields.present(), Utc::now()).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, KaptanError> {
        let mut conn = self.pool.acquire().await?;
        delete_row(&mut conn, TABLE, id).await
    }
}
