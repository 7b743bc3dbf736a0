//! Category domain model.

use serde::{Deserialize, Serialize};

/// A listing category. Listings and categories are many-to-many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
}
