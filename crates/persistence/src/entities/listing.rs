//! Listing entities (database row mappings).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use domain::models::{Address, Listing, ListingStatus, OfferType};

use super::decode_error;

/// Database row mapping for the listings table.
#[derive(Debug, Clone, FromRow)]
pub struct ListingEntity {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub status: String,
    pub offer_type: String,
    pub seller_id: i64,
    pub address_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ListingEntity> for Listing {
    type Error = sqlx::Error;

    fn try_from(entity: ListingEntity) -> Result<Self, Self::Error> {
        let status = ListingStatus::from_str(&entity.status)
            .ok_or_else(|| decode_error(format!("unknown listing status: {}", entity.status)))?;
        let offer_type = OfferType::from_str(&entity.offer_type)
            .ok_or_else(|| decode_error(format!("unknown offer type: {}", entity.offer_type)))?;
        Ok(Self {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            price: entity.price,
            status,
            offer_type,
            seller_id: entity.seller_id,
            address_id: entity.address_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

/// Listing row joined with its seller's name and (optionally) its address.
///
/// The join is a single round trip; address columns are NULL when the
/// listing has no address.
#[derive(Debug, Clone, FromRow)]
pub struct ListingWithContextEntity {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub status: String,
    pub offer_type: String,
    pub seller_id: i64,
    pub address_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub seller_first_name: String,
    pub seller_last_name: String,
    pub address_country: Option<String>,
    pub address_city: Option<String>,
    pub address_street: Option<String>,
    pub address_latitude: Option<f64>,
    pub address_longitude: Option<f64>,
}

/// A listing with the seller and address context discovery needs.
#[derive(Debug, Clone)]
pub struct ListingWithContext {
    pub listing: Listing,
    pub address: Option<Address>,
    pub seller_first_name: String,
    pub seller_last_name: String,
}

impl TryFrom<ListingWithContextEntity> for ListingWithContext {
    type Error = sqlx::Error;

    fn try_from(entity: ListingWithContextEntity) -> Result<Self, Self::Error> {
        let address = match (entity.address_id, entity.address_country, entity.address_city) {
            (Some(id), Some(country), Some(city)) => Some(Address {
                id,
                country,
                city,
                street: entity.address_street.unwrap_or_default(),
                latitude: entity.address_latitude,
                longitude: entity.address_longitude,
            }),
            _ => None,
        };

        let listing = Listing::try_from(ListingEntity {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            price: entity.price,
            status: entity.status,
            offer_type: entity.offer_type,
            seller_id: entity.seller_id,
            address_id: entity.address_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })?;

        Ok(Self {
            listing,
            address,
            seller_first_name: entity.seller_first_name,
            seller_last_name: entity.seller_last_name,
        })
    }
}
