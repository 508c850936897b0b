use chrono::Utc;
use serde::Deserialize;

use super::{require_patch_text, require_text};
use crate::db::models::{CaravanRoute, Difficulty, MapPoint};
use crate::db::patch::{FieldBag, Patch};
use crate::db::sql::{delete_row, insert_row, update_row};
use crate::db::store::SqlitePool;
use crate::error::KaptanError;

const TABLE: &str = "caravan_routes";
const COLUMNS: &str = "id, name, slug, description, content, featured_image, distance, duration, \
                       difficulty, locations, highlights, tips, gallery, map_coordinates, \
                       is_published, is_featured, meta_title, meta_description, view_count, \
                       created_at, updated_at";
const RECENCY: &str = "ORDER BY created_at DESC, id DESC";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCreate {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub featured_image: Option<String>,
    pub distance: Option<String>,
    pub duration: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub locations: Option<Vec<String>>,
    pub highlights: Option<Vec<String>>,
    pub tips: Option<Vec<String>>,
    pub gallery: Option<Vec<String>>,
    pub map_coordinates: Option<Vec<MapPoint>>,
    pub is_published: Option<bool>,
    pub is_featured: Option<bool>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutePatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Patch<String>,
    pub content: Patch<String>,
    pub featured_image: Patch<String>,
    pub distance: Patch<String>,
    pub duration: Patch<String>,
    pub difficulty: Option<Difficulty>,
    pub locations: Patch<Vec<String>>,
    pub highlights: Patch<Vec<String>>,
    pub tips: Patch<Vec<String>>,
    pub gallery: Patch<Vec<String>>,
    pub map_coordinates: Patch<Vec<MapPoint>>,
    pub is_published: Option<bool>,
    pub is_featured: Option<bool>,
    pub meta_title: Patch<String>,
    pub meta_description: Patch<String>,
}

fn json_opt<T>(v: Option<T>) -> Patch<T> {
    v.map_or(Patch::Absent, Patch::Value)
}

impl RouteCreate {
    fn into_fields(self) -> Result<FieldBag, KaptanError> {
        require_text("name", &self.name)?;
        require_text("slug", &self.slug)?;
        let bag = FieldBag::new()
            .set("name", Patch::Value(self.name))
            .set("slug", Patch::Value(self.slug))
            .opt("description", self.description)
            .opt("content", self.content)
            .opt("featured_image", self.featured_image)
            .opt("distance", self.distance)
            .opt("duration", self.duration)
            .opt("difficulty", self.difficulty.map(Difficulty::as_str))
            .opt("is_published", self.is_published)
            .opt("is_featured", self.is_featured)
            .opt("meta_title", self.meta_title)
            .opt("meta_description", self.meta_description)
            .set_json("locations", json_opt(self.locations))?
            .set_json("highlights", json_opt(self.highlights))?
            .set_json("tips", json_opt(self.tips))?
            .set_json("gallery", json_opt(self.gallery))?
            .set_json("map_coordinates", json_opt(self.map_coordinates))?;
        Ok(bag)
    }
}

impl RoutePatch {
    fn into_fields(self) -> Result<FieldBag, KaptanError> {
        require_patch_text("name", &self.name)?;
        require_patch_text("slug", &self.slug)?;
        let bag = FieldBag::new()
            .opt("name", self.name)
            .opt("slug", self.slug)
            .set("description", self.description)
            .set("content", self.content)
            .set("featured_image", self.featured_image)
            .set("distance", self.distance)
            .set("duration", self.duration)
            .opt("difficulty", self.difficulty.map(Difficulty::as_str))
            .opt("is_published", self.is_published)
            .opt("is_featured", self.is_featured)
            .set("meta_title", self.meta_title)
            .set("meta_description", self.meta_description)
            .set_json("locations", self.locations)?
            .set_json("highlights", self.highlights)?
            .set_json("tips", self.tips)?
            .set_json("gallery", self.gallery)?
            .set_json("map_coordinates", self.map_coordinates)?;
        Ok(bag)
    }
}

pub struct RouteRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RouteRepo<'a> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, published_only: bool) -> Result<Vec<CaravanRoute>, KaptanError> {
        let rows = sqlx::query_as::<_, CaravanRoute>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE (? = 0 OR is_published = 1) {RECENCY}"
        ))
        .bind(published_only)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<CaravanRoute>, KaptanError> {
        let row = sqlx::query_as::<_, CaravanRoute>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<CaravanRoute>, KaptanError> {
        let row = sqlx::query_as::<_, CaravanRoute>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE slug = ?"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    pub async fn featured(&self, limit: u32) -> Result<Vec<CaravanRoute>, KaptanError> {
        let rows = sqlx::query_as::<_, CaravanRoute>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE is_featured = 1 AND is_published = 1 \
             {RECENCY} LIMIT ?"
        ))
        .bind(i64::from(limit))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create(&self, input: RouteCreate) -> Result<i64, KaptanError> {
        let fields = input.into_fields()?;
        let mut conn = self.pool.acquire().await?;
        insert_row(&mut conn, TABLE, fields.present(), Utc::now()).await
    }

    pub async fn update(&self, id: i64, patch: RoutePatch) -> Result<bool, KaptanError> {
        let fields = patch.into_fields()?;
        let mut conn = self.pool.acquire().await?;
        update_row(&mut conn, TABLE, id, fields.present(), Utc::now()).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, KaptanError> {
        let mut conn = self.pool.acquire().await?;
        delete_row(&mut conn, TABLE, id).await
    }
}
