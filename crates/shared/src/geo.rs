//! Great-circle distance computation.

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate. Panics on out-of-range degrees; callers are
    /// expected to have validated user input already.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        assert!(
            (-90.0..=90.0).contains(&latitude),
            "latitude out of range: {latitude}"
        );
        assert!(
            (-180.0..=180.0).contains(&longitude),
            "longitude out of range: {longitude}"
        );
        Self {
            latitude,
            longitude,
        }
    }
}

/// Haversine distance between two coordinates, in kilometers.
///
/// Pure and symmetric: `distance_km(a, b) == distance_km(b, a)` within
/// floating-point tolerance, and `distance_km(a, a) == 0.0`.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (dlon / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}
