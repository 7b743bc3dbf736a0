//! Search alert endpoint handlers.
//!
//! All operations are scoped to the authenticated caller; another user's
//! alert is indistinguishable from a missing one.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use domain::models::{
    AlertResponse, CreateAlertRequest, FilterSpec, ListAlertsResponse, UpdateAlertRequest,
};
use persistence::repositories::{DeviceTokenRepository, SearchAlertRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CallerId;
use crate::services::DiscoveryService;

async fn validate_filters(state: &AppState, filters: &FilterSpec) -> Result<(), ApiError> {
    filters.validate()?;
    DiscoveryService::new(state.pool.clone())
        .check_categories_exist(filters)
        .await
}

/// POST /api/v1/alerts
pub async fn create_alert(
    State(state): State<AppState>,
    caller: CallerId,
    Json(request): Json<CreateAlertRequest>,
) -> Result<(StatusCode, Json<AlertResponse>), ApiError> {
    request.validate()?;
    validate_filters(&state, &request.filters).await?;

    let alerts = SearchAlertRepository::new(state.pool.clone());
    let tokens = DeviceTokenRepository::new(state.pool.clone());

    let alert = alerts
        .create(caller.0, &request.filters, request.is_active)
        .await?;
    tokens.register(caller.0, &request.device_push_token).await?;

    tracing::info!(alert_id = alert.id, user_id = caller.0, "Search alert created");
    Ok((StatusCode::CREATED, Json(alert.into())))
}

/// GET /api/v1/alerts
pub async fn list_alerts(
    State(state): State<AppState>,
    caller: CallerId,
) -> Result<Json<ListAlertsResponse>, ApiError> {
    let alerts = SearchAlertRepository::new(state.pool.clone())
        .find_by_user(caller.0)
        .await?;

    let alerts: Vec<AlertResponse> = alerts.into_iter().map(Into::into).collect();
    let total = alerts.len();
    Ok(Json(ListAlertsResponse { alerts, total }))
}

/// GET /api/v1/alerts/:id
pub async fn get_alert(
    State(state): State<AppState>,
    caller: CallerId,
    Path(id): Path<i64>,
) -> Result<Json<AlertResponse>, ApiError> {
    let alert = SearchAlertRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .filter(|a| a.user_id == caller.0)
        .ok_or_else(|| ApiError::NotFound(format!("Alert {id} not found")))?;

    Ok(Json(alert.into()))
}

/// PATCH /api/v1/alerts/:id
///
/// A supplied filter document is partial: its keys overlay the stored
/// document, everything else keeps its stored value.
pub async fn update_alert(
    State(state): State<AppState>,
    caller: CallerId,
    Path(id): Path<i64>,
    Json(request): Json<UpdateAlertRequest>,
) -> Result<Json<AlertResponse>, ApiError> {
    let alerts = SearchAlertRepository::new(state.pool.clone());

    let stored = alerts
        .find_by_id(id)
        .await?
        .filter(|a| a.user_id == caller.0)
        .ok_or_else(|| ApiError::NotFound(format!("Alert {id} not found")))?;

    let merged = match request.filters {
        Some(ref patch) => {
            let merged = stored
                .filters
                .apply_patch(patch)
                .map_err(|e| ApiError::Validation(format!("Invalid filter document: {e}")))?;
            validate_filters(&state, &merged).await?;
            Some(merged)
        }
        None => None,
    };

    let alert = alerts
        .update(id, caller.0, merged.as_ref(), request.is_active)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Alert {id} not found")))?;

    Ok(Json(alert.into()))
}

/// DELETE /api/v1/alerts/:id
pub async fn delete_alert(
    State(state): State<AppState>,
    caller: CallerId,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = SearchAlertRepository::new(state.pool.clone())
        .delete(id, caller.0)
        .await?;

    if !deleted {
        return Err(ApiError::NotFound(format!("Alert {id} not found")));
    }

    tracing::info!(alert_id = id, user_id = caller.0, "Search alert deleted");
    Ok(StatusCode::NO_CONTENT)
}
