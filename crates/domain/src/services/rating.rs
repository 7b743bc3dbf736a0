//! Seller rating aggregation.
//!
//! The batch form (one GROUP BY round trip for a whole seller set) lives in
//! the persistence layer; this is the shared arithmetic.

/// Rounds a raw mean to the two-decimal contract of the API.
pub fn round_rating(raw: f64) -> f64 {
    (raw * 100.0).round() / 100.0
}

/// Arithmetic mean of received ratings, rounded to two decimals.
///
/// A seller with zero reviews has no rating: the result is `None`, which is
/// excluded by any positive min-rating filter and sorts after all rated
/// sellers.
pub fn mean_rating(ratings: &[i16]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    Some(round_rating(sum as f64 / ratings.len() as f64))
}
