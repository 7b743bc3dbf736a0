//! Composable filter predicates over listing candidates.
//!
//! A [`FilterSpec`] compiles into a tagged list of predicate variants that
//! are AND-composed and evaluated in-process against candidates the store
//! has already scoped to a single non-REMOVED status. Ratings and distances
//! are batch-computed upstream and carried on the candidate, so evaluation
//! stays a pure function.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use shared::validation::truncate_to_second;

use crate::models::filter::{FilterSpec, PriceRange};
use crate::models::{Address, Listing, ListingStatus, OfferType};

/// A listing joined with everything the predicates and the ranker need.
#[derive(Debug, Clone)]
pub struct ListingCandidate {
    pub listing: Listing,
    pub address: Option<Address>,
    pub category_ids: Vec<i64>,
    /// Seller's aggregate rating, absent for sellers without reviews.
    pub rating: Option<f64>,
    /// Distance to the requesting user in kilometers, present only when the
    /// request carried a coordinate and the listing has one.
    pub distance_km: Option<f64>,
}

/// One filter criterion. Composed with logical AND.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Category membership: the listing's categories intersect the set.
    CategoryIn(Vec<i64>),
    OfferTypeIs(OfferType),
    /// Inclusive price bounds, open-ended on either side.
    PriceWithin(PriceRange),
    /// Offer-type-specific price bounds; a listing offered BOTH ways matches
    /// if either applicable range accepts its price.
    PricePerOffer {
        rent: Option<PriceRange>,
        sale: Option<PriceRange>,
    },
    /// Case-insensitive substring match on title or description.
    TextMatch(String),
    /// Seller aggregate rating at or above the threshold. Sellers without a
    /// rating never match.
    RatingAtLeast(f64),
    /// Distance to the user at or below the bound. Listings without a
    /// computed distance never match.
    WithinDistanceKm(f64),
    CountryIs(String),
    CityIs(String),
    StreetIs(String),
    /// `created_at` at or after the bound, compared at whole-second
    /// precision.
    CreatedSince(DateTime<Utc>),
}

impl Predicate {
    /// Compiles a validated filter document into its predicate list.
    ///
    /// Assumes [`FilterSpec::validate`] has passed; half-formed geo criteria
    /// never reach this point.
    pub fn build(spec: &FilterSpec) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        if let Some(ref ids) = spec.category_ids {
            predicates.push(Predicate::CategoryIn(ids.clone()));
        }
        if let Some(offer_type) = spec.offer_type {
            predicates.push(Predicate::OfferTypeIs(offer_type));
        }
        if spec.min_price.is_some() || spec.max_price.is_some() {
            predicates.push(Predicate::PriceWithin(PriceRange {
                min: spec.min_price,
                max: spec.max_price,
            }));
        }
        if spec.price_range_rent.is_some() || spec.price_range_sale.is_some() {
            predicates.push(Predicate::PricePerOffer {
                rent: spec.price_range_rent,
                sale: spec.price_range_sale,
            });
        }
        if let Some(ref term) = spec.search {
            let term = term.trim();
            if !term.is_empty() {
                predicates.push(Predicate::TextMatch(term.to_lowercase()));
            }
        }
        if let Some(min_rating) = spec.min_rating {
            if min_rating > 0.0 {
                predicates.push(Predicate::RatingAtLeast(min_rating));
            }
        }
        if let Some(max_km) = spec.max_distance_km {
            predicates.push(Predicate::WithinDistanceKm(max_km));
        }
        if let Some(ref country) = spec.country {
            predicates.push(Predicate::CountryIs(country.clone()));
        }
        if let Some(ref city) = spec.city {
            predicates.push(Predicate::CityIs(city.clone()));
        }
        if let Some(ref street) = spec.street {
            predicates.push(Predicate::StreetIs(street.clone()));
        }
        if let Some(since) = spec.created_since {
            predicates.push(Predicate::CreatedSince(truncate_to_second(since)));
        }

        predicates
    }

    /// Evaluates this predicate against one candidate.
    pub fn matches(&self, candidate: &ListingCandidate) -> bool {
        let listing = &candidate.listing;
        match self {
            Predicate::CategoryIn(ids) => candidate
                .category_ids
                .iter()
                .any(|id| ids.contains(id)),
            Predicate::OfferTypeIs(offer_type) => listing.offer_type == *offer_type,
            Predicate::PriceWithin(range) => range.contains(listing.price),
            Predicate::PricePerOffer { rent, sale } => {
                price_per_offer_matches(listing.offer_type, listing.price, *rent, *sale)
            }
            Predicate::TextMatch(term) => {
                listing.title.to_lowercase().contains(term)
                    || listing.description.to_lowercase().contains(term)
            }
            Predicate::RatingAtLeast(threshold) => {
                candidate.rating.is_some_and(|r| r >= *threshold)
            }
            Predicate::WithinDistanceKm(max_km) => {
                candidate.distance_km.is_some_and(|d| d <= *max_km)
            }
            Predicate::CountryIs(country) => candidate
                .address
                .as_ref()
                .is_some_and(|a| a.country == *country),
            Predicate::CityIs(city) => candidate
                .address
                .as_ref()
                .is_some_and(|a| a.city == *city),
            Predicate::StreetIs(street) => candidate
                .address
                .as_ref()
                .is_some_and(|a| a.street == *street),
            Predicate::CreatedSince(bound) => {
                truncate_to_second(listing.created_at) >= *bound
            }
        }
    }
}

fn price_per_offer_matches(
    offer_type: OfferType,
    price: Decimal,
    rent: Option<PriceRange>,
    sale: Option<PriceRange>,
) -> bool {
    let applicable: Vec<PriceRange> = match offer_type {
        OfferType::Rent => rent.into_iter().collect(),
        OfferType::Sell => sale.into_iter().collect(),
        OfferType::Both => rent.into_iter().chain(sale).collect(),
    };
    if applicable.is_empty() {
        // No range constrains this offer type.
        return true;
    }
    applicable.iter().any(|range| range.contains(price))
}

/// Applies an AND-composed predicate list to a candidate set.
///
/// REMOVED listings are dropped unconditionally; they must never be
/// discoverable regardless of what the store returned.
pub fn filter_candidates(
    predicates: &[Predicate],
    candidates: Vec<ListingCandidate>,
) -> Vec<ListingCandidate> {
    candidates
        .into_iter()
        .filter(|c| c.listing.status != ListingStatus::Removed)
        .filter(|c| predicates.iter().all(|p| p.matches(c)))
        .collect()
}
