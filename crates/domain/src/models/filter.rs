//! Filter specification for listing discovery and saved-search alerts.
//!
//! The same value type backs the synchronous discovery query and the filter
//! document persisted inside a search alert.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared::geo::Coordinate;
use shared::pagination::{PageParams, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use shared::validation::{validate_latitude, validate_longitude, validate_price};

use super::listing::{ListingStatus, OfferType};

/// Sort key for ranked results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    CreatedAt,
    UpdatedAt,
    Price,
    Rating,
    Distance,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Inclusive price interval with open-ended bounds on either side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Decimal>,
}

impl PriceRange {
    pub fn contains(&self, price: Decimal) -> bool {
        if let Some(min) = self.min {
            if price < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if price > max {
                return false;
            }
        }
        true
    }

    fn is_inverted(&self) -> bool {
        matches!((self.min, self.max), (Some(min), Some(max)) if min > max)
    }
}

/// Validation failures for a filter specification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Listing status cannot be REMOVED when filtering listings")]
    RemovedStatus,

    #[error("Both user latitude and longitude must be provided for location-based filtering")]
    HalfCoordinatePair,

    #[error("User coordinates are required for {0}")]
    MissingCoordinates(&'static str),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(&'static str),

    #[error("Maximum distance must be positive")]
    InvalidMaxDistance,

    #[error("Minimum price cannot exceed maximum price")]
    InvertedPriceRange,

    #[error("Prices must be non-negative")]
    NegativePrice,

    #[error("Minimum rating must be between 0 and 5")]
    InvalidMinRating,

    #[error("Limit must be at most {MAX_PAGE_SIZE}")]
    LimitTooLarge,
}

/// The full set of optional search criteria.
///
/// All fields are optional; an empty specification matches every ACTIVE
/// listing. Persisted as the alert's filter document, so the wire shape is
/// stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    pub category_ids: Option<Vec<i64>>,
    pub offer_type: Option<OfferType>,
    /// Status scope. Discovery defaults to ACTIVE; REMOVED is rejected.
    pub status: Option<ListingStatus>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Price bound applied only to rentable listings.
    pub price_range_rent: Option<PriceRange>,
    /// Price bound applied only to sellable listings.
    pub price_range_sale: Option<PriceRange>,
    pub min_rating: Option<f64>,
    /// Case-insensitive substring match against title or description.
    pub search: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub user_latitude: Option<f64>,
    pub user_longitude: Option<f64>,
    pub max_distance_km: Option<f64>,
    pub sort_by: SortKey,
    pub sort_order: SortDirection,
    pub offset: u32,
    pub limit: u32,
    /// Time lower bound on `created_at`, second-truncated. Injected by the
    /// alert matcher; never accepted from callers or persisted.
    #[serde(skip)]
    pub created_since: Option<DateTime<Utc>>,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            category_ids: None,
            offer_type: None,
            status: None,
            min_price: None,
            max_price: None,
            price_range_rent: None,
            price_range_sale: None,
            min_rating: None,
            search: None,
            country: None,
            city: None,
            street: None,
            user_latitude: None,
            user_longitude: None,
            max_distance_km: None,
            sort_by: SortKey::UpdatedAt,
            sort_order: SortDirection::Desc,
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
            created_since: None,
        }
    }
}

impl FilterSpec {
    /// Status scope the store query should apply. REMOVED never passes
    /// [`FilterSpec::validate`], so this cannot widen into soft-deleted rows.
    pub fn effective_status(&self) -> ListingStatus {
        self.status.unwrap_or(ListingStatus::Active)
    }

    /// The caller's coordinate, when both components were supplied.
    pub fn user_coordinate(&self) -> Option<Coordinate> {
        match (self.user_latitude, self.user_longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        }
    }

    /// Validated page parameters.
    pub fn page(&self) -> PageParams {
        PageParams {
            offset: self.offset,
            limit: self.limit,
        }
    }

    /// Overlays a partial filter document onto this one, field by field.
    ///
    /// Only the top-level keys present in `patch` change; everything else
    /// keeps its stored value. An explicit `null` clears a criterion. The
    /// result still needs [`FilterSpec::validate`] before use.
    pub fn apply_patch(&self, patch: &serde_json::Value) -> Result<FilterSpec, serde_json::Error> {
        let mut merged = serde_json::to_value(self)?;
        if let (Some(base), Some(overlay)) = (merged.as_object_mut(), patch.as_object()) {
            for (key, value) in overlay {
                base.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(merged)
    }

    /// Rejects malformed filter combinations before any querying happens.
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.status == Some(ListingStatus::Removed) {
            return Err(FilterError::RemovedStatus);
        }

        match (self.user_latitude, self.user_longitude) {
            (Some(lat), Some(lon)) => {
                if validate_latitude(lat).is_err() {
                    return Err(FilterError::InvalidCoordinate("latitude"));
                }
                if validate_longitude(lon).is_err() {
                    return Err(FilterError::InvalidCoordinate("longitude"));
                }
            }
            (None, None) => {}
            _ => return Err(FilterError::HalfCoordinatePair),
        }

        let has_coordinate = self.user_latitude.is_some() && self.user_longitude.is_some();
        if self.max_distance_km.is_some() && !has_coordinate {
            return Err(FilterError::MissingCoordinates("distance filtering"));
        }
        if self.sort_by == SortKey::Distance && !has_coordinate {
            return Err(FilterError::MissingCoordinates("distance sorting"));
        }
        if let Some(max_km) = self.max_distance_km {
            if max_km <= 0.0 {
                return Err(FilterError::InvalidMaxDistance);
            }
        }

        for price in [self.min_price, self.max_price].into_iter().flatten() {
            if validate_price(&price).is_err() {
                return Err(FilterError::NegativePrice);
            }
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(FilterError::InvertedPriceRange);
            }
        }
        for range in [self.price_range_rent, self.price_range_sale]
            .into_iter()
            .flatten()
        {
            for bound in [range.min, range.max].into_iter().flatten() {
                if validate_price(&bound).is_err() {
                    return Err(FilterError::NegativePrice);
                }
            }
            if range.is_inverted() {
                return Err(FilterError::InvertedPriceRange);
            }
        }

        if let Some(min_rating) = self.min_rating {
            if !(0.0..=5.0).contains(&min_rating) {
                return Err(FilterError::InvalidMinRating);
            }
        }

        if self.limit > MAX_PAGE_SIZE {
            return Err(FilterError::LimitTooLarge);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_spec_is_valid() {
        let spec = FilterSpec::default();
        assert!(spec.validate().is_ok());
        assert_eq!(spec.sort_by, SortKey::UpdatedAt);
        assert_eq!(spec.sort_order, SortDirection::Desc);
        assert_eq!(spec.effective_status(), ListingStatus::Active);
    }

    #[test]
    fn test_removed_status_rejected() {
        let spec = FilterSpec {
            status: Some(ListingStatus::Removed),
            ..Default::default()
        };
        assert_eq!(spec.validate(), Err(FilterError::RemovedStatus));
    }

    #[test]
    fn test_half_coordinate_pair_rejected() {
        let spec = FilterSpec {
            user_latitude: Some(48.1),
            ..Default::default()
        };
        assert_eq!(spec.validate(), Err(FilterError::HalfCoordinatePair));

        let spec = FilterSpec {
            user_longitude: Some(17.1),
            ..Default::default()
        };
        assert_eq!(spec.validate(), Err(FilterError::HalfCoordinatePair));
    }

    #[test]
    fn test_max_distance_without_coordinates_rejected() {
        let spec = FilterSpec {
            max_distance_km: Some(10.0),
            ..Default::default()
        };
        assert_eq!(
            spec.validate(),
            Err(FilterError::MissingCoordinates("distance filtering"))
        );
    }

    #[test]
    fn test_distance_sort_without_coordinates_rejected() {
        let spec = FilterSpec {
            sort_by: SortKey::Distance,
            ..Default::default()
        };
        assert_eq!(
            spec.validate(),
            Err(FilterError::MissingCoordinates("distance sorting"))
        );
    }

    #[test]
    fn test_out_of_range_coordinates_rejected() {
        let spec = FilterSpec {
            user_latitude: Some(95.0),
            user_longitude: Some(17.1),
            ..Default::default()
        };
        assert_eq!(spec.validate(), Err(FilterError::InvalidCoordinate("latitude")));
    }

    #[test]
    fn test_inverted_price_range_rejected() {
        let spec = FilterSpec {
            min_price: Some(Decimal::from(150)),
            max_price: Some(Decimal::from(50)),
            ..Default::default()
        };
        assert_eq!(spec.validate(), Err(FilterError::InvertedPriceRange));
    }

    #[test]
    fn test_negative_price_rejected() {
        let spec = FilterSpec {
            min_price: Some(Decimal::from(-1)),
            ..Default::default()
        };
        assert_eq!(spec.validate(), Err(FilterError::NegativePrice));
    }

    #[test]
    fn test_price_range_contains_inclusive_bounds() {
        let range = PriceRange {
            min: Some(Decimal::from(50)),
            max: Some(Decimal::from(150)),
        };
        assert!(range.contains(Decimal::from(50)));
        assert!(range.contains(Decimal::from(100)));
        assert!(range.contains(Decimal::from(150)));
        assert!(!range.contains(Decimal::from(200)));
        assert!(!range.contains(Decimal::from(49)));
    }

    #[test]
    fn test_open_ended_price_range() {
        let range = PriceRange {
            min: Some(Decimal::from(10)),
            max: None,
        };
        assert!(range.contains(Decimal::from(1_000_000)));
        assert!(!range.contains(Decimal::from(9)));
    }

    #[test]
    fn test_min_rating_bounds() {
        let spec = FilterSpec {
            min_rating: Some(5.5),
            ..Default::default()
        };
        assert_eq!(spec.validate(), Err(FilterError::InvalidMinRating));
    }

    #[test]
    fn test_limit_too_large_rejected() {
        let spec = FilterSpec {
            limit: MAX_PAGE_SIZE + 1,
            ..Default::default()
        };
        assert_eq!(spec.validate(), Err(FilterError::LimitTooLarge));
    }

    #[test]
    fn test_filter_document_round_trip() {
        let spec = FilterSpec {
            category_ids: Some(vec![1, 3]),
            offer_type: Some(OfferType::Rent),
            search: Some("bike".to_string()),
            price_range_rent: Some(PriceRange {
                min: Some(Decimal::from(10)),
                max: Some(Decimal::from(40)),
            }),
            sort_by: SortKey::Price,
            sort_order: SortDirection::Asc,
            ..Default::default()
        };
        let json = serde_json::to_value(&spec).unwrap();
        let parsed: FilterSpec = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.category_ids, Some(vec![1, 3]));
        assert_eq!(parsed.offer_type, Some(OfferType::Rent));
        assert_eq!(parsed.sort_by, SortKey::Price);
        assert!(parsed.created_since.is_none());
    }

    #[test]
    fn test_created_since_never_serialized() {
        let spec = FilterSpec {
            created_since: Some(chrono::Utc::now()),
            ..Default::default()
        };
        let json = serde_json::to_string(&spec).unwrap();
        assert!(!json.contains("createdSince"));
    }

    #[test]
    fn test_apply_patch_keeps_unsent_fields() {
        let stored = FilterSpec {
            category_ids: Some(vec![1, 2]),
            search: Some("bike".to_string()),
            min_price: Some(Decimal::from(50)),
            ..Default::default()
        };

        let patch = serde_json::json!({"search": "kayak"});
        let merged = stored.apply_patch(&patch).unwrap();

        assert_eq!(merged.search.as_deref(), Some("kayak"));
        assert_eq!(merged.category_ids, Some(vec![1, 2]));
        assert_eq!(merged.min_price, Some(Decimal::from(50)));
    }

    #[test]
    fn test_apply_patch_null_clears_a_criterion() {
        let stored = FilterSpec {
            category_ids: Some(vec![1, 2]),
            max_price: Some(Decimal::from(300)),
            ..Default::default()
        };

        let patch = serde_json::json!({"maxPrice": null});
        let merged = stored.apply_patch(&patch).unwrap();

        assert!(merged.max_price.is_none());
        assert_eq!(merged.category_ids, Some(vec![1, 2]));
    }

    #[test]
    fn test_apply_patch_result_still_validates() {
        let stored = FilterSpec::default();
        let patch = serde_json::json!({"maxDistanceKm": 10.0});
        let merged = stored.apply_patch(&patch).unwrap();
        assert_eq!(
            merged.validate(),
            Err(FilterError::MissingCoordinates("distance filtering"))
        );
    }

    #[test]
    fn test_partial_document_gets_defaults() {
        let parsed: FilterSpec = serde_json::from_str(r#"{"search": "kayak"}"#).unwrap();
        assert_eq!(parsed.search.as_deref(), Some("kayak"));
        assert_eq!(parsed.sort_by, SortKey::UpdatedAt);
        assert_eq!(parsed.limit, DEFAULT_PAGE_SIZE);
    }
}
