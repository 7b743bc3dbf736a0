//! Repository implementations for database operations.

pub mod category;
pub mod device_token;
pub mod favorite;
pub mod listing;
pub mod review;
pub mod search_alert;

pub use category::CategoryRepository;
pub use device_token::DeviceTokenRepository;
pub use favorite::FavoriteRepository;
pub use listing::ListingRepository;
pub use review::ReviewRepository;
pub use search_alert::SearchAlertRepository;
