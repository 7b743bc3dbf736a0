//! Notification service for push notifications.
//!
//! Provides abstractions for multicasting push notifications to the device
//! tokens of an alert owner.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notification type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    NewListings,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::NewListings => write!(f, "new_listings"),
        }
    }
}

/// Notification payload for new listings matching a saved search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListingsPayload {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub alert_id: i64,
    pub listing_ids: Vec<i64>,
    pub match_count: usize,
    pub timestamp: DateTime<Utc>,
}

/// A notification addressed to every registered device of one user.
#[derive(Debug, Clone)]
pub struct MulticastMessage {
    pub title: String,
    pub body: String,
    pub data: NewListingsPayload,
    pub tokens: Vec<String>,
}

/// Result of a send attempt against a single device token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSendOutcome {
    /// The provider accepted the message for this token.
    Sent,
    /// The token is unregistered or malformed; the device should re-register.
    InvalidToken,
    /// Sending failed (non-blocking).
    Failed(String),
}

/// Per-token outcomes of one multicast attempt.
#[derive(Debug, Clone, Default)]
pub struct MulticastReport {
    pub outcomes: Vec<(String, TokenSendOutcome)>,
}

impl MulticastReport {
    pub fn record(&mut self, token: impl Into<String>, outcome: TokenSendOutcome) {
        self.outcomes.push((token.into(), outcome));
    }

    /// Number of tokens the provider accepted.
    pub fn sent_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o == TokenSendOutcome::Sent)
            .count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.sent_count()
    }

    /// Whether at least one token was accepted. This is the bar for counting
    /// the multicast as a delivery attempt.
    pub fn any_sent(&self) -> bool {
        self.sent_count() > 0
    }

    /// Tokens the provider reported as unregistered or malformed.
    pub fn invalid_tokens(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o == TokenSendOutcome::InvalidToken)
            .map(|(t, _)| t.as_str())
            .collect()
    }
}

/// Notification service trait for sending push notifications.
#[async_trait::async_trait]
pub trait NotificationService: Send + Sync {
    /// Send a new-listings notification to every token in the message.
    ///
    /// Always returns a report; per-token failures are recorded, never
    /// propagated as errors.
    async fn send_new_listings(&self, message: &MulticastMessage) -> MulticastReport;
}

/// Mock notification service for development and testing.
///
/// Logs notifications but doesn't actually send them.
#[derive(Debug, Default)]
pub struct MockNotificationService {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    calls: AtomicUsize,
}

impl MockNotificationService {
    /// Create a new mock notification service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock service that simulates failures.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of multicast attempts made against this mock.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl NotificationService for MockNotificationService {
    async fn send_new_listings(&self, message: &MulticastMessage) -> MulticastReport {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut report = MulticastReport::default();

        if self.simulate_failure {
            tracing::warn!(
                alert_id = %message.data.alert_id,
                tokens = %message.tokens.len(),
                "Mock notification service simulating failure"
            );
            for token in &message.tokens {
                report.record(token.clone(), TokenSendOutcome::Failed("Simulated failure".to_string()));
            }
            return report;
        }

        tracing::info!(
            alert_id = %message.data.alert_id,
            match_count = %message.data.match_count,
            tokens = %message.tokens.len(),
            title = %message.title,
            "Mock: Would send new_listings notification"
        );
        for token in &message.tokens {
            report.record(token.clone(), TokenSendOutcome::Sent);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(tokens: &[&str]) -> MulticastMessage {
        MulticastMessage {
            title: "New listings".to_string(),
            body: "3 new listings match your saved search".to_string(),
            data: NewListingsPayload {
                notification_type: NotificationType::NewListings,
                alert_id: 42,
                listing_ids: vec![1, 2, 3],
                match_count: 3,
                timestamp: Utc::now(),
            },
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_notification_type_display() {
        assert_eq!(NotificationType::NewListings.to_string(), "new_listings");
    }

    #[test]
    fn test_new_listings_payload_serialization() {
        let payload = NewListingsPayload {
            notification_type: NotificationType::NewListings,
            alert_id: 7,
            listing_ids: vec![11, 12],
            match_count: 2,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"type\":\"new_listings\""));
        assert!(json.contains("\"alertId\":7"));
        assert!(json.contains("\"listingIds\":[11,12]"));
        assert!(json.contains("\"matchCount\":2"));
    }

    #[test]
    fn test_report_counts() {
        let mut report = MulticastReport::default();
        report.record("a", TokenSendOutcome::Sent);
        report.record("b", TokenSendOutcome::InvalidToken);
        report.record("c", TokenSendOutcome::Failed("timeout".to_string()));

        assert_eq!(report.sent_count(), 1);
        assert_eq!(report.failure_count(), 2);
        assert!(report.any_sent());
        assert_eq!(report.invalid_tokens(), vec!["b"]);
    }

    #[test]
    fn test_empty_report_has_no_sends() {
        let report = MulticastReport::default();
        assert!(!report.any_sent());
        assert_eq!(report.failure_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_notification_service_send() {
        let service = MockNotificationService::new();
        let report = service.send_new_listings(&message(&["t1", "t2"])).await;
        assert_eq!(report.sent_count(), 2);
        assert_eq!(service.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_notification_service_failure() {
        let service = MockNotificationService::failing();
        let report = service.send_new_listings(&message(&["t1"])).await;
        assert!(!report.any_sent());
        assert_eq!(report.failure_count(), 1);
    }
}
