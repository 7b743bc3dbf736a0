//! Device push token entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the device_tokens table.
///
/// One row per registered push token; a user may hold several.
#[derive(Debug, Clone, FromRow)]
pub struct DeviceTokenEntity {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub created_at: DateTime<Utc>,
}
