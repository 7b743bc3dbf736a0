//! Listing domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Address, Category};

/// Lifecycle status of a listing.
///
/// REMOVED listings are soft-deleted and must never surface through
/// discovery or alert matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Active,
    Hidden,
    Sold,
    Rented,
    Removed,
}

impl ListingStatus {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Hidden => "hidden",
            ListingStatus::Sold => "sold",
            ListingStatus::Rented => "rented",
            ListingStatus::Removed => "removed",
        }
    }

    /// Parses from database string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ListingStatus::Active),
            "hidden" => Some(ListingStatus::Hidden),
            "sold" => Some(ListingStatus::Sold),
            "rented" => Some(ListingStatus::Rented),
            "removed" => Some(ListingStatus::Removed),
            _ => None,
        }
    }
}

/// Whether a listing is offered for sale, for rent, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferType {
    Sell,
    Rent,
    Both,
}

impl OfferType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferType::Sell => "sell",
            OfferType::Rent => "rent",
            OfferType::Both => "both",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sell" => Some(OfferType::Sell),
            "rent" => Some(OfferType::Rent),
            "both" => Some(OfferType::Both),
            _ => None,
        }
    }
}

/// Represents a listing in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub status: ListingStatus,
    pub offer_type: OfferType,
    pub seller_id: i64,
    pub address_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Seller block attached to listing summaries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Mean received-review rating rounded to two decimals, absent for
    /// sellers without reviews.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

/// One entry of a discovery result page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub status: ListingStatus,
    pub offer_type: OfferType,
    pub liked: bool,
    pub seller: SellerSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    pub categories: Vec<Category>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Distance from the requesting user in kilometers, present only when
    /// the request carried a coordinate and the listing has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// Response for a discovery query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListListingsResponse {
    pub listings: Vec<ListingSummary>,
    pub total: usize,
}
