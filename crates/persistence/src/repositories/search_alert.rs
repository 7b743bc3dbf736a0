//! Search alert repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::{FilterSpec, SearchAlert};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::entities::SearchAlertEntity;

const ALERT_COLUMNS: &str =
    "id, user_id, filters, is_active, last_notified_at, created_at, updated_at";

/// Repository for search alert database operations.
#[derive(Clone)]
pub struct SearchAlertRepository {
    pool: PgPool,
}

impl SearchAlertRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new search alert. `last_notified_at` starts at the creation
    /// instant so only listings created afterwards can ever match.
    pub async fn create(
        &self,
        user_id: i64,
        filters: &FilterSpec,
        is_active: bool,
    ) -> Result<SearchAlert, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO search_alerts (user_id, filters, is_active, last_notified_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING {ALERT_COLUMNS}
            "#
        );

        let entity = sqlx::query_as::<_, SearchAlertEntity>(&query)
            .bind(user_id)
            .bind(Json(filters))
            .bind(is_active)
            .fetch_one(&self.pool)
            .await?;

        Ok(entity.into())
    }

    /// Find alert by ID.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<SearchAlert>, sqlx::Error> {
        let query = format!("SELECT {ALERT_COLUMNS} FROM search_alerts WHERE id = $1");

        let entity = sqlx::query_as::<_, SearchAlertEntity>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(entity.map(Into::into))
    }

    /// List all alerts owned by a user, newest first.
    pub async fn find_by_user(&self, user_id: i64) -> Result<Vec<SearchAlert>, sqlx::Error> {
        let query = format!(
            "SELECT {ALERT_COLUMNS} FROM search_alerts WHERE user_id = $1 ORDER BY created_at DESC"
        );

        let entities = sqlx::query_as::<_, SearchAlertEntity>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Update an alert's filter document and/or active flag. Absent fields
    /// keep their stored value. Scoped to the owner.
    pub async fn update(
        &self,
        id: i64,
        user_id: i64,
        filters: Option<&FilterSpec>,
        is_active: Option<bool>,
    ) -> Result<Option<SearchAlert>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE search_alerts
            SET filters = COALESCE($3, filters),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {ALERT_COLUMNS}
            "#
        );

        let entity = sqlx::query_as::<_, SearchAlertEntity>(&query)
            .bind(id)
            .bind(user_id)
            .bind(filters.map(Json))
            .bind(is_active)
            .fetch_optional(&self.pool)
            .await?;

        Ok(entity.map(Into::into))
    }

    /// Delete an alert. Scoped to the owner.
    pub async fn delete(&self, id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM search_alerts WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Active alerts whose cooldown has elapsed, oldest-notified first.
    pub async fn due_for_evaluation(
        &self,
        cooldown_minutes: u32,
        limit: u32,
    ) -> Result<Vec<SearchAlert>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {ALERT_COLUMNS}
            FROM search_alerts
            WHERE is_active
              AND last_notified_at <= NOW() - make_interval(mins => $1)
            ORDER BY last_notified_at ASC
            LIMIT $2
            "#
        );

        let entities = sqlx::query_as::<_, SearchAlertEntity>(&query)
            .bind(cooldown_minutes as i32)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Advance `last_notified_at` after a recorded dispatch attempt. The
    /// guard keeps the column monotonically non-decreasing under races.
    pub async fn advance_last_notified(
        &self,
        id: i64,
        to: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE search_alerts
            SET last_notified_at = $2
            WHERE id = $1 AND last_notified_at < $2
            "#,
        )
        .bind(id)
        .bind(to)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
