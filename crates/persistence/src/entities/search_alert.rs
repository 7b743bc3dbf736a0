//! Search alert entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

use domain::models::{FilterSpec, SearchAlert};

/// Database row mapping for the search_alerts table.
///
/// The filter document is stored as JSONB in the same camelCase shape the
/// discovery endpoint accepts.
#[derive(Debug, Clone, FromRow)]
pub struct SearchAlertEntity {
    pub id: i64,
    pub user_id: i64,
    pub filters: Json<FilterSpec>,
    pub is_active: bool,
    pub last_notified_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SearchAlertEntity> for SearchAlert {
    fn from(entity: SearchAlertEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            filters: entity.filters.0,
            is_active: entity.is_active,
            last_notified_at: entity.last_notified_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
