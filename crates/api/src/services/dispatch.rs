//! Notification dispatch for matched alerts.
//!
//! Builds the multicast message for an alert's match set, sends it through
//! the configured [`NotificationService`], and decides whether the attempt
//! counts as a delivery. Only a counted attempt advances the alert's
//! `last_notified_at`.

use chrono::{DateTime, Utc};

use domain::services::{
    MulticastMessage, MulticastReport, NewListingsPayload, NotificationService, NotificationType,
};

/// What the matcher should do after a dispatch attempt.
#[derive(Debug)]
pub struct DispatchOutcome {
    /// Whether the attempt counts and `last_notified_at` should advance.
    pub advance: bool,
    /// Tokens the provider reported as unregistered, due for removal.
    pub invalid_tokens: Vec<String>,
}

/// Build the push message for an alert's new matches.
pub fn build_message(
    alert_id: i64,
    listing_ids: Vec<i64>,
    tokens: Vec<String>,
    now: DateTime<Utc>,
) -> MulticastMessage {
    let match_count = listing_ids.len();
    let body = if match_count == 1 {
        "1 new listing matches your saved search".to_string()
    } else {
        format!("{match_count} new listings match your saved search")
    };

    MulticastMessage {
        title: "New listings".to_string(),
        body,
        data: NewListingsPayload {
            notification_type: NotificationType::NewListings,
            alert_id,
            listing_ids,
            match_count,
            timestamp: now,
        },
        tokens,
    }
}

/// An attempt counts once the provider accepted the message for at least
/// one token. A total provider failure does not count, so the alert stays
/// due and is retried after the next pass.
pub fn should_advance(report: &MulticastReport) -> bool {
    report.any_sent()
}

/// Multicast an alert's matches to the owner's devices.
pub async fn notify_alert(
    notifier: &dyn NotificationService,
    alert_id: i64,
    listing_ids: Vec<i64>,
    tokens: Vec<String>,
    now: DateTime<Utc>,
) -> DispatchOutcome {
    if tokens.is_empty() {
        tracing::warn!(alert_id, "Alert matched but owner has no device tokens");
        return DispatchOutcome {
            advance: false,
            invalid_tokens: Vec::new(),
        };
    }

    let message = build_message(alert_id, listing_ids, tokens, now);
    let report = notifier.send_new_listings(&message).await;

    tracing::info!(
        alert_id,
        sent = report.sent_count(),
        failed = report.failure_count(),
        "Alert notification dispatched"
    );

    DispatchOutcome {
        advance: should_advance(&report),
        invalid_tokens: report
            .invalid_tokens()
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::services::{MockNotificationService, TokenSendOutcome};

    #[tokio::test]
    async fn test_successful_dispatch_advances() {
        let notifier = MockNotificationService::new();
        let outcome = notify_alert(
            &notifier,
            1,
            vec![10, 11],
            vec!["t1".to_string(), "t2".to_string()],
            Utc::now(),
        )
        .await;

        assert!(outcome.advance);
        assert!(outcome.invalid_tokens.is_empty());
        assert_eq!(notifier.call_count(), 1);
    }

    #[tokio::test]
    async fn test_total_failure_does_not_advance() {
        let notifier = MockNotificationService::failing();
        let outcome = notify_alert(&notifier, 1, vec![10], vec!["t1".to_string()], Utc::now()).await;

        assert!(!outcome.advance);
        assert_eq!(notifier.call_count(), 1);
    }

    #[tokio::test]
    async fn test_no_tokens_skips_without_sending() {
        let notifier = MockNotificationService::new();
        let outcome = notify_alert(&notifier, 1, vec![10], Vec::new(), Utc::now()).await;

        assert!(!outcome.advance);
        assert_eq!(notifier.call_count(), 0);
    }

    #[test]
    fn test_partial_acceptance_counts_as_attempt() {
        let mut report = MulticastReport::default();
        report.record("a", TokenSendOutcome::Sent);
        report.record("b", TokenSendOutcome::Failed("timeout".to_string()));
        assert!(should_advance(&report));

        let mut all_failed = MulticastReport::default();
        all_failed.record("a", TokenSendOutcome::Failed("timeout".to_string()));
        all_failed.record("b", TokenSendOutcome::InvalidToken);
        assert!(!should_advance(&all_failed));
    }

    #[test]
    fn test_message_body_counts_matches() {
        let message = build_message(1, vec![5], vec!["t".to_string()], Utc::now());
        assert_eq!(message.body, "1 new listing matches your saved search");

        let message = build_message(1, vec![5, 6, 7], vec!["t".to_string()], Utc::now());
        assert_eq!(message.body, "3 new listings match your saved search");
        assert_eq!(message.data.match_count, 3);
    }
}
