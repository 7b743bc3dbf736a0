//! Review repository for database operations.

use std::collections::HashMap;

use domain::services::round_rating;
use sqlx::{FromRow, PgPool};

#[derive(Debug, FromRow)]
struct SellerRatingRow {
    reviewee_id: i64,
    avg_rating: f64,
}

/// Repository for review database operations.
#[derive(Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Mean received-review rating per seller, one GROUP BY round trip for
    /// the whole set. Sellers without reviews are absent from the map.
    pub async fn avg_ratings_for_sellers(
        &self,
        seller_ids: &[i64],
    ) -> Result<HashMap<i64, f64>, sqlx::Error> {
        if seller_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, SellerRatingRow>(
            r#"
            SELECT reviewee_id, AVG(rating)::float8 AS avg_rating
            FROM reviews
            WHERE reviewee_id = ANY($1)
            GROUP BY reviewee_id
            "#,
        )
        .bind(seller_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.reviewee_id, round_rating(row.avg_rating)))
            .collect())
    }
}
