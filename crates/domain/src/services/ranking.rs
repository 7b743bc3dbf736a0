//! Deterministic ordering and pagination of filtered candidates.

use std::cmp::Ordering;

use shared::pagination::PageParams;

use crate::models::filter::{SortDirection, SortKey};
use crate::services::predicate::ListingCandidate;

/// Sorts candidates by the requested key and direction, then applies offset
/// and limit.
///
/// Ties on the sort key break on ascending listing id, so equal-key rows
/// keep one order across repeated queries and page boundaries. Candidates
/// missing an optional key (rating, distance) sort after all candidates
/// that have it, in both directions.
pub fn rank_and_page(
    mut candidates: Vec<ListingCandidate>,
    sort_by: SortKey,
    sort_order: SortDirection,
    page: PageParams,
) -> Vec<ListingCandidate> {
    candidates.sort_by(|a, b| {
        compare_by_key(a, b, sort_by, sort_order).then_with(|| a.listing.id.cmp(&b.listing.id))
    });
    page.slice(candidates)
}

fn compare_by_key(
    a: &ListingCandidate,
    b: &ListingCandidate,
    key: SortKey,
    direction: SortDirection,
) -> Ordering {
    match key {
        SortKey::CreatedAt => directed(a.listing.created_at.cmp(&b.listing.created_at), direction),
        SortKey::UpdatedAt => directed(a.listing.updated_at.cmp(&b.listing.updated_at), direction),
        SortKey::Price => directed(a.listing.price.cmp(&b.listing.price), direction),
        SortKey::Rating => compare_optional(a.rating, b.rating, direction),
        SortKey::Distance => compare_optional(a.distance_km, b.distance_km, direction),
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Present values order before absent ones regardless of direction; the
/// direction applies only among present values.
fn compare_optional(a: Option<f64>, b: Option<f64>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => directed(x.total_cmp(&y), direction),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::models::{Listing, ListingStatus, OfferType};

    fn candidate(id: i64, price: i64) -> ListingCandidate {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        ListingCandidate {
            listing: Listing {
                id,
                title: format!("Listing {id}"),
                description: String::new(),
                price: Decimal::from(price),
                status: ListingStatus::Active,
                offer_type: OfferType::Sell,
                seller_id: 10,
                address_id: None,
                created_at: base + Duration::minutes(id),
                updated_at: base + Duration::minutes(id),
            },
            address: None,
            category_ids: Vec::new(),
            rating: None,
            distance_km: None,
        }
    }

    fn ids(candidates: &[ListingCandidate]) -> Vec<i64> {
        candidates.iter().map(|c| c.listing.id).collect()
    }

    fn full_page() -> PageParams {
        PageParams::new(0, 100).unwrap()
    }

    #[test]
    fn test_sort_by_price_both_directions() {
        let input = vec![candidate(1, 30), candidate(2, 10), candidate(3, 20)];

        let asc = rank_and_page(
            input.clone(),
            SortKey::Price,
            SortDirection::Asc,
            full_page(),
        );
        assert_eq!(ids(&asc), vec![2, 3, 1]);

        let desc = rank_and_page(input, SortKey::Price, SortDirection::Desc, full_page());
        assert_eq!(ids(&desc), vec![1, 3, 2]);
    }

    #[test]
    fn test_ties_break_on_ascending_id() {
        let input = vec![candidate(5, 10), candidate(1, 10), candidate(3, 10)];
        let ranked = rank_and_page(input, SortKey::Price, SortDirection::Desc, full_page());
        assert_eq!(ids(&ranked), vec![1, 3, 5]);
    }

    #[test]
    fn test_unrated_candidates_sort_last_in_both_directions() {
        let mut rated_low = candidate(1, 10);
        rated_low.rating = Some(2.0);
        let mut rated_high = candidate(2, 10);
        rated_high.rating = Some(4.5);
        let unrated = candidate(3, 10);

        let desc = rank_and_page(
            vec![unrated.clone(), rated_low.clone(), rated_high.clone()],
            SortKey::Rating,
            SortDirection::Desc,
            full_page(),
        );
        assert_eq!(ids(&desc), vec![2, 1, 3]);

        let asc = rank_and_page(
            vec![unrated, rated_low, rated_high],
            SortKey::Rating,
            SortDirection::Asc,
            full_page(),
        );
        assert_eq!(ids(&asc), vec![1, 2, 3]);
    }

    #[test]
    fn test_distance_sort_places_unlocated_last() {
        let mut near = candidate(1, 10);
        near.distance_km = Some(1.5);
        let mut far = candidate(2, 10);
        far.distance_km = Some(80.0);
        let unlocated = candidate(3, 10);

        let ranked = rank_and_page(
            vec![unlocated, far, near],
            SortKey::Distance,
            SortDirection::Asc,
            full_page(),
        );
        assert_eq!(ids(&ranked), vec![1, 2, 3]);
    }

    #[test]
    fn test_pagination_slices_the_ranked_order() {
        let input: Vec<_> = (1..=5).map(|id| candidate(id, id * 10)).collect();
        let page = rank_and_page(
            input,
            SortKey::Price,
            SortDirection::Asc,
            PageParams::new(1, 2).unwrap(),
        );
        assert_eq!(ids(&page), vec![2, 3]);
    }

    #[test]
    fn test_zero_limit_yields_empty_page() {
        let input = vec![candidate(1, 10), candidate(2, 20)];
        let page = rank_and_page(
            input,
            SortKey::Price,
            SortDirection::Asc,
            PageParams::new(0, 0).unwrap(),
        );
        assert!(page.is_empty());
    }

    #[test]
    fn test_created_at_descending_is_newest_first() {
        let input = vec![candidate(1, 10), candidate(3, 10), candidate(2, 10)];
        let ranked = rank_and_page(input, SortKey::CreatedAt, SortDirection::Desc, full_page());
        assert_eq!(ids(&ranked), vec![3, 2, 1]);
    }
}
