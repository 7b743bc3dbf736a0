//! Listing discovery endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use domain::models::{FilterSpec, ListListingsResponse, ListingSummary};
use shared::geo::Coordinate;
use shared::validation::{validate_latitude, validate_longitude};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CallerId;
use crate::services::DiscoveryService;

/// Optional caller position for the detail endpoint's distance field.
#[derive(Debug, Default, Deserialize)]
pub struct DetailQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl DetailQuery {
    /// Both components or neither; out-of-range values are a request fault.
    fn coordinate(&self) -> Result<Option<Coordinate>, ApiError> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                validate_latitude(lat)
                    .and(validate_longitude(lon))
                    .map_err(|e| {
                        ApiError::Validation(
                            e.message
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| "Invalid coordinate".to_string()),
                        )
                    })?;
                Ok(Some(Coordinate::new(lat, lon)))
            }
            (None, None) => Ok(None),
            _ => Err(ApiError::Validation(
                "Both lat and lon must be provided for a distance field".to_string(),
            )),
        }
    }
}

/// POST /api/v1/listings/search
///
/// Runs a discovery query over the filter document in the body. Anonymous
/// callers are allowed; the liked flag is then false everywhere.
pub async fn search_listings(
    State(state): State<AppState>,
    caller: Option<CallerId>,
    Json(spec): Json<FilterSpec>,
) -> Result<Json<ListListingsResponse>, ApiError> {
    let discovery = DiscoveryService::new(state.pool.clone());
    let response = discovery.search(caller.map(|c| c.0), &spec).await?;
    Ok(Json(response))
}

/// GET /api/v1/listings/:id
///
/// `lat`/`lon` query parameters add a distance field when the listing has a
/// coordinate of its own.
pub async fn get_listing(
    State(state): State<AppState>,
    caller: Option<CallerId>,
    Path(id): Path<i64>,
    Query(query): Query<DetailQuery>,
) -> Result<Json<ListingSummary>, ApiError> {
    let user_coord = query.coordinate()?;
    let discovery = DiscoveryService::new(state.pool.clone());
    let summary = discovery
        .get_listing(caller.map(|c| c.0), id, user_coord)
        .await?;
    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_query_requires_both_components() {
        let query = DetailQuery {
            lat: Some(48.1),
            lon: None,
        };
        assert!(matches!(query.coordinate(), Err(ApiError::Validation(_))));

        let query = DetailQuery {
            lat: None,
            lon: Some(17.1),
        };
        assert!(matches!(query.coordinate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_detail_query_rejects_out_of_range() {
        let query = DetailQuery {
            lat: Some(95.0),
            lon: Some(17.1),
        };
        assert!(matches!(query.coordinate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_detail_query_absent_means_no_coordinate() {
        assert!(DetailQuery::default().coordinate().unwrap().is_none());

        let query = DetailQuery {
            lat: Some(48.1486),
            lon: Some(17.1077),
        };
        assert!(query.coordinate().unwrap().is_some());
    }
}
