//! Alert matching pass.
//!
//! One pass selects due alerts, re-runs each alert's stored filter over
//! listings created since its last notification, and dispatches a push for
//! non-empty match sets. Alerts are evaluated by a bounded worker pool and
//! each alert fails in isolation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use domain::models::{FilterSpec, SearchAlert};
use domain::services::NotificationService;
use persistence::repositories::{DeviceTokenRepository, SearchAlertRepository};
use shared::validation::truncate_to_second;

use crate::config::AlertsConfig;
use crate::services::discovery::DiscoveryService;
use crate::services::dispatch::{self, DispatchOutcome};

/// Counters reported after a matcher pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassSummary {
    pub evaluated: usize,
    pub notified: usize,
    pub failed: usize,
}

impl PassSummary {
    /// Folds one alert's result into the counters. A failed alert counts as
    /// evaluated, so a bad alert never stalls the rest of the batch.
    fn absorb(&mut self, outcome: Result<bool, String>) {
        self.evaluated += 1;
        match outcome {
            Ok(true) => self.notified += 1,
            Ok(false) => {}
            Err(_) => self.failed += 1,
        }
    }
}

/// The filter document the pass evaluates for an alert: the stored criteria
/// with the time window anchored at the last notification, second-truncated
/// on both sides of the comparison.
fn prepare_spec(alert: &SearchAlert) -> FilterSpec {
    let mut spec = alert.filters.clone();
    spec.created_since = Some(truncate_to_second(alert.last_notified_at));
    spec
}

/// Dispatches when the match set is non-empty. No matches means no attempt
/// at all, so `last_notified_at` stays put.
async fn dispatch_if_matched(
    notifier: &dyn NotificationService,
    alert_id: i64,
    matched: Vec<i64>,
    tokens: Vec<String>,
    now: DateTime<Utc>,
) -> Option<DispatchOutcome> {
    if matched.is_empty() {
        return None;
    }
    Some(dispatch::notify_alert(notifier, alert_id, matched, tokens, now).await)
}

pub struct AlertMatcherService {
    alerts: SearchAlertRepository,
    tokens: DeviceTokenRepository,
    discovery: DiscoveryService,
    notifier: Arc<dyn NotificationService>,
    config: AlertsConfig,
}

impl AlertMatcherService {
    pub fn new(pool: PgPool, config: AlertsConfig, notifier: Arc<dyn NotificationService>) -> Self {
        Self {
            alerts: SearchAlertRepository::new(pool.clone()),
            tokens: DeviceTokenRepository::new(pool.clone()),
            discovery: DiscoveryService::new(pool),
            notifier,
            config,
        }
    }

    /// Run one matcher pass over all due alerts.
    pub async fn run_pass(self: &Arc<Self>) -> Result<PassSummary, sqlx::Error> {
        let due = self
            .alerts
            .due_for_evaluation(self.config.cooldown_minutes, self.config.batch_size)
            .await?;

        if due.is_empty() {
            return Ok(PassSummary::default());
        }

        tracing::info!(due = due.len(), "Alert matcher pass starting");

        let semaphore = Arc::new(Semaphore::new(self.config.worker_concurrency));
        let mut workers = JoinSet::new();

        for alert in due {
            let service = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            workers.spawn(async move {
                // The semaphore is never closed; Err is unreachable.
                let _permit = semaphore.acquire_owned().await.ok();
                let alert_id = alert.id;
                service.evaluate_alert(alert).await.map_err(|e| (alert_id, e))
            });
        }

        let mut summary = PassSummary::default();
        while let Some(joined) = workers.join_next().await {
            let outcome = match joined {
                Ok(Ok(notified)) => Ok(notified),
                Ok(Err((alert_id, e))) => {
                    tracing::error!(alert_id, error = %e, "Alert evaluation failed");
                    Err(e)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Alert evaluation task panicked");
                    Err(e.to_string())
                }
            };
            summary.absorb(outcome);
        }

        tracing::info!(
            evaluated = summary.evaluated,
            notified = summary.notified,
            failed = summary.failed,
            "Alert matcher pass finished"
        );
        Ok(summary)
    }

    /// Evaluate one alert; returns whether a notification attempt was
    /// counted.
    async fn evaluate_alert(&self, alert: SearchAlert) -> Result<bool, String> {
        let now = Utc::now();
        let spec = prepare_spec(&alert);

        let matched = self
            .discovery
            .matching_listing_ids(&spec)
            .await
            .map_err(|e| e.to_string())?;

        let tokens = if matched.is_empty() {
            Vec::new()
        } else {
            self.tokens
                .tokens_for_user(alert.user_id)
                .await
                .map_err(|e| e.to_string())?
        };

        let Some(outcome) =
            dispatch_if_matched(self.notifier.as_ref(), alert.id, matched, tokens, now).await
        else {
            return Ok(false);
        };

        if !outcome.invalid_tokens.is_empty() {
            let removed = self
                .tokens
                .remove_tokens(&outcome.invalid_tokens)
                .await
                .map_err(|e| e.to_string())?;
            tracing::info!(alert_id = alert.id, removed, "Pruned unregistered device tokens");
        }

        if outcome.advance {
            self.alerts
                .advance_last_notified(alert.id, now)
                .await
                .map_err(|e| e.to_string())?;
        }

        Ok(outcome.advance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};
    use domain::services::MockNotificationService;

    fn alert_with_filters(filters: FilterSpec) -> SearchAlert {
        let notified = Utc
            .with_ymd_and_hms(2024, 6, 15, 14, 30, 45)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        SearchAlert {
            id: 9,
            user_id: 3,
            filters,
            is_active: true,
            last_notified_at: notified,
            created_at: notified,
            updated_at: notified,
        }
    }

    #[test]
    fn test_prepare_spec_anchors_window_at_last_notification() {
        let alert = alert_with_filters(FilterSpec {
            category_ids: Some(vec![1, 2]),
            search: Some("bike".to_string()),
            ..Default::default()
        });

        let spec = prepare_spec(&alert);
        let since = spec.created_since.unwrap();
        assert_eq!(since.nanosecond(), 0);
        assert_eq!(since, truncate_to_second(alert.last_notified_at));
        // Stored criteria pass through untouched.
        assert_eq!(spec.category_ids, Some(vec![1, 2]));
        assert_eq!(spec.search.as_deref(), Some("bike"));
    }

    #[tokio::test]
    async fn test_no_matches_means_no_attempt() {
        let notifier = MockNotificationService::new();
        let outcome = dispatch_if_matched(
            &notifier,
            9,
            Vec::new(),
            vec!["t1".to_string()],
            Utc::now(),
        )
        .await;

        assert!(outcome.is_none());
        assert_eq!(notifier.call_count(), 0);
    }

    #[tokio::test]
    async fn test_matches_dispatch_and_count_as_attempt() {
        let notifier = MockNotificationService::new();
        let outcome = dispatch_if_matched(
            &notifier,
            9,
            vec![10, 11],
            vec!["t1".to_string()],
            Utc::now(),
        )
        .await
        .unwrap();

        assert!(outcome.advance);
        assert_eq!(notifier.call_count(), 1);
    }

    #[test]
    fn test_summary_isolates_per_alert_failures() {
        let mut summary = PassSummary::default();
        summary.absorb(Ok(true));
        summary.absorb(Err("bad filter document".to_string()));
        summary.absorb(Ok(false));
        summary.absorb(Ok(true));

        assert_eq!(summary.evaluated, 4);
        assert_eq!(summary.notified, 2);
        assert_eq!(summary.failed, 1);
    }
}
