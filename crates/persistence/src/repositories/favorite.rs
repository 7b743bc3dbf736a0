//! Favorite listing repository for database operations.

use std::collections::HashSet;

use sqlx::PgPool;

/// Repository for favorite listing database operations.
#[derive(Clone)]
pub struct FavoriteRepository {
    pool: PgPool,
}

impl FavoriteRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// IDs of all listings the user has marked as favorite.
    pub async fn favorite_listing_ids(&self, user_id: i64) -> Result<HashSet<i64>, sqlx::Error> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT listing_id FROM favorite_listings WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }
}
