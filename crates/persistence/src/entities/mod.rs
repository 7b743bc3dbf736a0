//! Entity definitions (database row mappings).

pub mod category;
pub mod device_token;
pub mod listing;
pub mod search_alert;

pub use category::CategoryEntity;
pub use device_token::DeviceTokenEntity;
pub use listing::{ListingEntity, ListingWithContext, ListingWithContextEntity};
pub use search_alert::SearchAlertEntity;

/// Wraps an enum-string decoding failure as a sqlx decode error.
pub(crate) fn decode_error(message: String) -> sqlx::Error {
    sqlx::Error::Decode(message.into())
}
