//! Category repository for database operations.

use sqlx::PgPool;

/// Repository for category database operations.
#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the subset of the given IDs that do not exist, preserving
    /// input order.
    pub async fn find_missing_ids(&self, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let existing: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM categories WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids
            .iter()
            .copied()
            .filter(|id| !existing.contains(id))
            .collect())
    }
}
