//! Device push token repository for database operations.

use sqlx::PgPool;

/// Repository for device push token database operations.
#[derive(Clone)]
pub struct DeviceTokenRepository {
    pool: PgPool,
}

impl DeviceTokenRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a push token for a user. Re-registering an existing token
    /// is a no-op.
    pub async fn register(&self, user_id: i64, token: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO device_tokens (user_id, token)
            VALUES ($1, $2)
            ON CONFLICT (user_id, token) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All push tokens registered for a user, oldest first.
    pub async fn tokens_for_user(&self, user_id: i64) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT token FROM device_tokens WHERE user_id = $1 ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Remove tokens the push provider reported as unregistered.
    pub async fn remove_tokens(&self, tokens: &[String]) -> Result<u64, sqlx::Error> {
        if tokens.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            DELETE FROM device_tokens WHERE token = ANY($1)
            "#,
        )
        .bind(tokens)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
