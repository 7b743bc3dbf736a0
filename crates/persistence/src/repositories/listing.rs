//! Listing repository for database operations.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use domain::models::{Category, ListingStatus};
use sqlx::{FromRow, PgPool};

use crate::entities::{ListingWithContext, ListingWithContextEntity};

const CONTEXT_COLUMNS: &str = r#"
    l.id, l.title, l.description, l.price, l.status, l.offer_type,
    l.seller_id, l.address_id, l.created_at, l.updated_at,
    u.first_name AS seller_first_name, u.last_name AS seller_last_name,
    a.country AS address_country, a.city AS address_city, a.street AS address_street,
    a.latitude AS address_latitude, a.longitude AS address_longitude
"#;

#[derive(Debug, FromRow)]
struct ListingCategoryRow {
    listing_id: i64,
    id: i64,
    name: String,
}

/// Repository for listing database operations.
#[derive(Clone)]
pub struct ListingRepository {
    pool: PgPool,
}

impl ListingRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch all listings in one status, joined with seller name and
    /// address, optionally restricted to listings created at or after a
    /// bound (compared at whole-second precision).
    pub async fn find_by_status(
        &self,
        status: ListingStatus,
        created_since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ListingWithContext>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {CONTEXT_COLUMNS}
            FROM listings l
            JOIN users u ON u.id = l.seller_id
            LEFT JOIN addresses a ON a.id = l.address_id
            WHERE l.status = $1
              AND ($2::timestamptz IS NULL OR date_trunc('second', l.created_at) >= $2)
            ORDER BY l.id
            "#
        );

        let entities = sqlx::query_as::<_, ListingWithContextEntity>(&query)
            .bind(status.as_str())
            .bind(created_since)
            .fetch_all(&self.pool)
            .await?;

        entities.into_iter().map(TryInto::try_into).collect()
    }

    /// Find one listing by ID with seller and address context.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<ListingWithContext>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {CONTEXT_COLUMNS}
            FROM listings l
            JOIN users u ON u.id = l.seller_id
            LEFT JOIN addresses a ON a.id = l.address_id
            WHERE l.id = $1
            "#
        );

        let entity = sqlx::query_as::<_, ListingWithContextEntity>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        entity.map(TryInto::try_into).transpose()
    }

    /// Categories for a set of listings in one round trip.
    pub async fn categories_for_listings(
        &self,
        listing_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<Category>>, sqlx::Error> {
        if listing_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ListingCategoryRow>(
            r#"
            SELECT lc.listing_id, c.id, c.name
            FROM listing_categories lc
            JOIN categories c ON c.id = lc.category_id
            WHERE lc.listing_id = ANY($1)
            ORDER BY lc.listing_id, c.name
            "#,
        )
        .bind(listing_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_listing: HashMap<i64, Vec<Category>> = HashMap::new();
        for row in rows {
            by_listing.entry(row.listing_id).or_default().push(Category {
                id: row.id,
                name: row.name,
            });
        }
        Ok(by_listing)
    }
}
