//! Category entity (database row mapping).

use sqlx::FromRow;

use domain::models::Category;

/// Database row mapping for the categories table.
#[derive(Debug, Clone, FromRow)]
pub struct CategoryEntity {
    pub id: i64,
    pub name: String,
}

impl From<CategoryEntity> for Category {
    fn from(entity: CategoryEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
        }
    }
}
