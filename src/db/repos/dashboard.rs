use crate::db::models::DashboardStats;
use crate::db::store::SqlitePool;
use crate::error::KaptanError;

pub struct DashboardRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> DashboardRepo<'a> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Row counts, drafts included.
    pub async fn stats(&self) -> Result<DashboardStats, KaptanError> {
        let (posts, routes, categories, pages): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT \
               (SELECT COUNT(*) FROM posts), \
               (SELECT COUNT(*) FROM caravan_routes), \
               (SELECT COUNT(*) FROM categories), \
               (SELECT COUNT(*) FROM pages)",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(DashboardStats {
            posts,
            routes,
            categories,
            pages,
        })
    }
}
