//! Domain layer for the marketplace backend.
//!
//! This crate contains:
//! - Domain models (Listing, Address, Category, SearchAlert)
//! - The filter specification and predicate builder
//! - Result ranking and rating aggregation
//! - The notification-service abstraction

pub mod models;
pub mod services;
