//! Domain model definitions.

pub mod address;
pub mod category;
pub mod filter;
pub mod listing;
pub mod search_alert;

pub use address::Address;
pub use category::Category;
pub use filter::{FilterError, FilterSpec, PriceRange, SortDirection, SortKey};
pub use listing::{
    ListListingsResponse, Listing, ListingStatus, ListingSummary, OfferType, SellerSummary,
};
pub use search_alert::{
    AlertResponse, CreateAlertRequest, ListAlertsResponse, SearchAlert, UpdateAlertRequest,
};
