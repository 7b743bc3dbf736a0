//! Saved-search alert domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::filter::FilterSpec;

/// A user's saved search, periodically re-evaluated against new listings.
///
/// `last_notified_at` is monotonically non-decreasing and is advanced only
/// by the alert matcher after a recorded dispatch attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAlert {
    pub id: i64,
    pub user_id: i64,
    /// The persisted filter document, the same shape the discovery query
    /// consumes.
    pub filters: FilterSpec,
    pub is_active: bool,
    pub last_notified_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a search alert.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertRequest {
    pub filters: FilterSpec,

    /// Push token of the device creating the alert; registered for the
    /// owner if not already known.
    #[validate(length(min = 1, max = 512, message = "Device push token must be 1-512 characters"))]
    pub device_push_token: String,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Request payload for updating an alert.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlertRequest {
    /// Partial filter document. Only the keys present here change in the
    /// stored document ([`FilterSpec::apply_patch`]); absent means the
    /// filters are untouched.
    pub filters: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}

/// Response payload for alert operations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertResponse {
    pub id: i64,
    pub filters: FilterSpec,
    pub is_active: bool,
    pub last_notified_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SearchAlert> for AlertResponse {
    fn from(a: SearchAlert) -> Self {
        Self {
            id: a.id,
            filters: a.filters,
            is_active: a.is_active,
            last_notified_at: a.last_notified_at,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

/// Response for listing a user's alerts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAlertsResponse {
    pub alerts: Vec<AlertResponse>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_alert_request_deserialization() {
        let json = r#"{
            "filters": {"search": "bike", "categoryIds": [2]},
            "devicePushToken": "fcm-token-abc"
        }"#;

        let request: CreateAlertRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.filters.search.as_deref(), Some("bike"));
        assert_eq!(request.filters.category_ids, Some(vec![2]));
        assert_eq!(request.device_push_token, "fcm-token-abc");
        assert!(request.is_active); // default
    }

    #[test]
    fn test_update_alert_request_partial() {
        let json = r#"{"isActive": false}"#;
        let request: UpdateAlertRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.is_active, Some(false));
        assert!(request.filters.is_none());
    }

    #[test]
    fn test_update_alert_request_carries_partial_filters() {
        let json = r#"{"filters": {"search": "kayak"}}"#;
        let request: UpdateAlertRequest = serde_json::from_str(json).unwrap();

        let stored = FilterSpec {
            category_ids: Some(vec![1, 2]),
            search: Some("bike".to_string()),
            ..Default::default()
        };
        let merged = stored.apply_patch(&request.filters.unwrap()).unwrap();
        assert_eq!(merged.search.as_deref(), Some("kayak"));
        assert_eq!(merged.category_ids, Some(vec![1, 2]));
    }

    #[test]
    fn test_alert_response_serialization() {
        let now = Utc::now();
        let alert = SearchAlert {
            id: 7,
            user_id: 3,
            filters: FilterSpec::default(),
            is_active: true,
            last_notified_at: now,
            created_at: now,
            updated_at: now,
        };
        let response: AlertResponse = alert.into();
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"id\":7"));
        assert!(json.contains("\"isActive\":true"));
        // Owner identity is not exposed on the wire.
        assert!(!json.contains("userId"));
    }
}
