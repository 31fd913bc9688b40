use sqlx::{postgres::PgPoolOptions, PgPool};
use std::collections::HashSet;

use crate::{
    error::AppResult,
    models::{ItemId, LikeRecord, User},
};

use super::LikesStore;

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Likes store backed by the `users`, `likes` and `quotes` tables
#[derive(Clone)]
pub struct PgLikesStore {
    pool: PgPool,
}

impl PgLikesStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled schema migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl LikesStore for PgLikesStore {
    async fn fetch_like_records(&self) -> AppResult<Vec<LikeRecord>> {
        // Serialized like lists keep this store on the same loader path as the CSV one
        let records = sqlx::query_as::<_, LikeRecord>(
            r#"
            SELECT u.id AS user_id,
                   u.name,
                   COALESCE(
                       json_agg(l.quote_id ORDER BY l.quote_id)
                           FILTER (WHERE l.quote_id IS NOT NULL),
                       '[]'::json
                   )::text AS likes
            FROM users u
            LEFT JOIN likes l ON l.user_id = u.id
            GROUP BY u.id, u.name
            ORDER BY u.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(users = records.len(), "Fetched like records from Postgres");
        Ok(records)
    }

    async fn fetch_catalog(&self) -> AppResult<HashSet<ItemId>> {
        let ids: Vec<ItemId> = sqlx::query_scalar("SELECT id FROM quotes")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn find_user(&self, user_id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, name FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_name(&self, name: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, name FROM users WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn fetch_user_likes(&self, user_id: i64) -> AppResult<Vec<ItemId>> {
        let likes: Vec<ItemId> =
            sqlx::query_scalar("SELECT quote_id FROM likes WHERE user_id = $1 ORDER BY quote_id")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(likes)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
