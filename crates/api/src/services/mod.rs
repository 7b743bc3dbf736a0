//! Application services.

pub mod alert_matcher;
pub mod discovery;
pub mod dispatch;
pub mod fcm;

pub use alert_matcher::{AlertMatcherService, PassSummary};
pub use discovery::DiscoveryService;
