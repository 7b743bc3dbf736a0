//! Address domain model.

use serde::{Deserialize, Serialize};
use shared::geo::Coordinate;
use shared::validation::{validate_latitude, validate_longitude};

/// A listing address. Coordinates are optional; a listing without them is
/// unreachable by geographic filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: i64,
    pub country: String,
    pub city: String,
    pub street: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Address {
    /// Returns the address coordinate when both components are present and
    /// in range. An out-of-range stored value degrades to no coordinate
    /// rather than failing the request carrying it.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon))
                if validate_latitude(lat).is_ok() && validate_longitude(lon).is_ok() =>
            {
                Some(Coordinate::new(lat, lon))
            }
            _ => None,
        }
    }
}
