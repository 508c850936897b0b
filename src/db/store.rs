use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use super::repos::{
    CategoryRepo, DashboardRepo, FeatureCardRepo, HeroSectionRepo, MediaRepo, PageRepo, PostRepo,
    RouteRepo, SettingRepo, TeamMemberRepo, UserRepo,
};
use super::schema::SQLITE_INIT;
use crate::auth::OwnerPolicy;
use crate::error::KaptanError;

pub type SqlitePool = Pool<Sqlite>;

/// Handle to the relational store. Built once at start-up and passed to
/// whatever needs it; cloning shares the pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    owner: OwnerPolicy,
}

impl Store {
    pub fn new(pool: SqlitePool, owner: OwnerPolicy) -> Self {
        Self { pool, owner }
    }

    /// Open (creating if needed) the database and apply the schema.
    pub async fn connect(database_url: &str, owner: OwnerPolicy) -> Result<Self, KaptanError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(connect_opts)
            .await?;
        let store = Self::new(pool, owner);
        store.init_schema().await?;
        info!(database_url = %database_url, "content store ready");
        Ok(store)
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), KaptanError> {
        // sqlx::query runs a single statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn users(&self) -> UserRepo<'_> {
        UserRepo::new(&self.pool, &self.owner)
    }

    pub fn categories(&self) -> CategoryRepo<'_> {
        CategoryRepo::new(&self.pool)
    }

    pub fn posts(&self) -> PostRepo<'_> {
        PostRepo::new(&self.pool)
    }

    pub fn routes(&self) -> RouteRepo<'_> {
        RouteRepo::new(&self.pool)
    }

    pub fn settings(&self) -> SettingRepo<'_> {
        SettingRepo::new(&self.pool)
    }

    pub fn pages(&self) -> PageRepo<'_> {
        PageRepo::new(&self.pool)
    }

    pub fn hero_sections(&self) -> HeroSectionRepo<'_> {
        HeroSectionRepo::new(&self.pool)
    }

    pub fn feature_cards(&self) -> FeatureCardRepo<'_> {
        FeatureCardRepo::new(&self.pool)
    }

    pub fn team_members(&self) -> TeamMemberRepo<'_> {
        TeamMemberRepo::new(&self.pool)
    }

    pub fn media(&self) -> MediaRepo<'_> {
        MediaRepo::new(&self.pool)
    }

    pub fn dashboard(&self) -> DashboardRepo<'_> {
        DashboardRepo::new(&self.pool)
    }
}
