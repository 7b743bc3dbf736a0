//! Domain services for the marketplace backend.
//!
//! Services contain business logic that operates on domain models.

pub mod notification;
pub mod predicate;
pub mod ranking;
pub mod rating;

pub use notification::{
    MockNotificationService, MulticastMessage, MulticastReport, NewListingsPayload,
    NotificationService, NotificationType, TokenSendOutcome,
};

pub use predicate::{filter_candidates, ListingCandidate, Predicate};
pub use ranking::rank_and_page;
pub use rating::{mean_rating, round_rating};
