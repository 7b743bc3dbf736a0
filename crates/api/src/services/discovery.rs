//! Listing discovery pipeline.
//!
//! One facade behind both the search endpoint and the alert matcher:
//! validate the filter document, check referenced categories exist, fetch
//! status-scoped candidates with their context in batch round trips, then
//! filter, rank and paginate in process.

use std::collections::{HashMap, HashSet};

use sqlx::PgPool;

use domain::models::{Category, FilterSpec, ListListingsResponse, ListingSummary, SellerSummary};
use domain::services::{filter_candidates, rank_and_page, ListingCandidate, Predicate};
use persistence::entities::ListingWithContext;
use persistence::repositories::{
    CategoryRepository, FavoriteRepository, ListingRepository, ReviewRepository,
};
use shared::geo::{distance_km, Coordinate};

use crate::error::ApiError;

/// Seller names kept aside while candidates flow through filter and rank.
type SellerNames = HashMap<i64, (String, String)>;

#[derive(Clone)]
pub struct DiscoveryService {
    listings: ListingRepository,
    categories: CategoryRepository,
    reviews: ReviewRepository,
    favorites: FavoriteRepository,
}

impl DiscoveryService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            listings: ListingRepository::new(pool.clone()),
            categories: CategoryRepository::new(pool.clone()),
            reviews: ReviewRepository::new(pool.clone()),
            favorites: FavoriteRepository::new(pool),
        }
    }

    /// Run a discovery query and assemble the result page.
    ///
    /// `caller` controls the liked flag; anonymous callers get `liked:
    /// false` everywhere.
    pub async fn search(
        &self,
        caller: Option<i64>,
        spec: &FilterSpec,
    ) -> Result<ListListingsResponse, ApiError> {
        spec.validate()?;
        self.check_categories_exist(spec).await?;

        let (candidates, seller_names, categories_by_listing) = self.load_candidates(spec).await?;

        let predicates = Predicate::build(spec);
        let matched = filter_candidates(&predicates, candidates);
        let total = matched.len();

        let page = rank_and_page(matched, spec.sort_by, spec.sort_order, spec.page());

        let liked: HashSet<i64> = match caller {
            Some(user_id) => self.favorites.favorite_listing_ids(user_id).await?,
            None => HashSet::new(),
        };

        let listings = page
            .into_iter()
            .map(|c| summarize(c, &seller_names, &categories_by_listing, &liked))
            .collect();

        Ok(ListListingsResponse { listings, total })
    }

    /// IDs of listings matching a filter document, unpaginated.
    ///
    /// Used by the alert matcher, which injects `created_since` before
    /// calling.
    pub async fn matching_listing_ids(&self, spec: &FilterSpec) -> Result<Vec<i64>, ApiError> {
        spec.validate()?;

        let (candidates, _, _) = self.load_candidates(spec).await?;
        let predicates = Predicate::build(spec);

        Ok(filter_candidates(&predicates, candidates)
            .into_iter()
            .map(|c| c.listing.id)
            .collect())
    }

    /// Fetch one listing as a summary card. REMOVED listings are not found.
    /// A caller coordinate adds a distance field when the listing has one.
    pub async fn get_listing(
        &self,
        caller: Option<i64>,
        id: i64,
        user_coord: Option<Coordinate>,
    ) -> Result<ListingSummary, ApiError> {
        let row = self
            .listings
            .find_by_id(id)
            .await?
            .filter(|r| r.listing.status != domain::models::ListingStatus::Removed)
            .ok_or_else(|| ApiError::NotFound(format!("Listing {id} not found")))?;

        let categories = self.listings.categories_for_listings(&[id]).await?;
        let ratings = self
            .reviews
            .avg_ratings_for_sellers(&[row.listing.seller_id])
            .await?;

        let liked = match caller {
            Some(user_id) => self
                .favorites
                .favorite_listing_ids(user_id)
                .await?
                .contains(&id),
            None => false,
        };

        let rating = ratings.get(&row.listing.seller_id).copied();
        let mut seller_names = SellerNames::new();
        seller_names.insert(
            id,
            (row.seller_first_name.clone(), row.seller_last_name.clone()),
        );

        let candidate = to_candidate(row, Vec::new(), rating, user_coord);
        let liked_set: HashSet<i64> = if liked { HashSet::from([id]) } else { HashSet::new() };
        Ok(summarize(candidate, &seller_names, &categories, &liked_set))
    }

    /// Rejects filter documents referencing categories that do not exist.
    pub async fn check_categories_exist(&self, spec: &FilterSpec) -> Result<(), ApiError> {
        if let Some(ref ids) = spec.category_ids {
            let missing = self.categories.find_missing_ids(ids).await?;
            if let Some(id) = missing.first() {
                return Err(ApiError::NotFound(format!("Category {id} not found")));
            }
        }
        Ok(())
    }

    /// Fetch status-scoped listings with everything the predicates and the
    /// assembler need: categories and seller ratings in one batch round
    /// trip each, distances computed here.
    async fn load_candidates(
        &self,
        spec: &FilterSpec,
    ) -> Result<(Vec<ListingCandidate>, SellerNames, HashMap<i64, Vec<Category>>), ApiError> {
        let rows = self
            .listings
            .find_by_status(spec.effective_status(), spec.created_since)
            .await?;

        let listing_ids: Vec<i64> = rows.iter().map(|r| r.listing.id).collect();
        let mut seller_ids: Vec<i64> = rows.iter().map(|r| r.listing.seller_id).collect();
        seller_ids.sort_unstable();
        seller_ids.dedup();

        let categories_by_listing = self.listings.categories_for_listings(&listing_ids).await?;
        let ratings = self.reviews.avg_ratings_for_sellers(&seller_ids).await?;
        let user_coord = spec.user_coordinate();

        let mut seller_names = SellerNames::new();
        let mut candidates = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.listing.id;
            seller_names.insert(
                id,
                (row.seller_first_name.clone(), row.seller_last_name.clone()),
            );
            let category_ids = categories_by_listing
                .get(&id)
                .map(|cats| cats.iter().map(|c| c.id).collect())
                .unwrap_or_default();
            let rating = ratings.get(&row.listing.seller_id).copied();
            candidates.push(to_candidate(row, category_ids, rating, user_coord));
        }

        Ok((candidates, seller_names, categories_by_listing))
    }
}

fn to_candidate(
    row: ListingWithContext,
    category_ids: Vec<i64>,
    rating: Option<f64>,
    user_coord: Option<Coordinate>,
) -> ListingCandidate {
    let distance = match (user_coord, row.address.as_ref().and_then(|a| a.coordinate())) {
        (Some(user), Some(listing)) => Some(distance_km(user, listing)),
        _ => None,
    };

    ListingCandidate {
        listing: row.listing,
        address: row.address,
        category_ids,
        rating,
        distance_km: distance,
    }
}

fn summarize(
    candidate: ListingCandidate,
    seller_names: &SellerNames,
    categories_by_listing: &HashMap<i64, Vec<Category>>,
    liked: &HashSet<i64>,
) -> ListingSummary {
    let listing = candidate.listing;
    let (first_name, last_name) = seller_names
        .get(&listing.id)
        .cloned()
        .unwrap_or_default();

    ListingSummary {
        id: listing.id,
        title: listing.title,
        description: listing.description,
        price: listing.price,
        status: listing.status,
        offer_type: listing.offer_type,
        liked: liked.contains(&listing.id),
        seller: SellerSummary {
            id: listing.seller_id,
            first_name,
            last_name,
            rating: candidate.rating,
        },
        address: candidate.address,
        categories: categories_by_listing
            .get(&listing.id)
            .cloned()
            .unwrap_or_default(),
        created_at: listing.created_at,
        updated_at: listing.updated_at,
        distance_km: candidate.distance_km,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::models::{Address, Listing, ListingStatus, OfferType};
    use rust_decimal::Decimal;

    fn row(id: i64) -> ListingWithContext {
        ListingWithContext {
            listing: Listing {
                id,
                title: "City bike".to_string(),
                description: String::new(),
                price: Decimal::from(120),
                status: ListingStatus::Active,
                offer_type: OfferType::Sell,
                seller_id: 7,
                address_id: Some(1),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            address: Some(Address {
                id: 1,
                country: "SK".to_string(),
                city: "Bratislava".to_string(),
                street: "Obchodna 1".to_string(),
                latitude: Some(48.1486),
                longitude: Some(17.1077),
            }),
            seller_first_name: "Jana".to_string(),
            seller_last_name: "Nova".to_string(),
        }
    }

    #[test]
    fn test_candidate_distance_needs_both_coordinates() {
        let user = Coordinate::new(48.1486, 17.1077);
        let candidate = to_candidate(row(1), vec![], None, Some(user));
        assert!(candidate.distance_km.unwrap() < 0.1);

        let mut homeless = row(2);
        homeless.address = None;
        let candidate = to_candidate(homeless, vec![], None, Some(user));
        assert!(candidate.distance_km.is_none());

        let candidate = to_candidate(row(3), vec![], None, None);
        assert!(candidate.distance_km.is_none());
    }

    #[test]
    fn test_summarize_carries_seller_and_liked() {
        let candidate = to_candidate(row(5), vec![2], Some(4.5), None);
        let mut names = SellerNames::new();
        names.insert(5, ("Jana".to_string(), "Nova".to_string()));
        let mut categories = HashMap::new();
        categories.insert(
            5,
            vec![Category {
                id: 2,
                name: "Bikes".to_string(),
            }],
        );
        let liked = HashSet::from([5]);

        let summary = summarize(candidate, &names, &categories, &liked);
        assert!(summary.liked);
        assert_eq!(summary.seller.first_name, "Jana");
        assert_eq!(summary.seller.rating, Some(4.5));
        assert_eq!(summary.categories.len(), 1);
    }

    #[test]
    fn test_summarize_unliked_without_caller_favorites() {
        let candidate = to_candidate(row(5), vec![], None, None);
        let summary = summarize(candidate, &SellerNames::new(), &HashMap::new(), &HashSet::new());
        assert!(!summary.liked);
        assert!(summary.seller.rating.is_none());
    }
}
