//! Periodic alert matching job.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use domain::services::NotificationService;

use crate::config::AlertsConfig;
use crate::jobs::{Job, JobFrequency};
use crate::services::AlertMatcherService;

/// Runs an alert matcher pass on a fixed interval.
///
/// Passes never overlap: the interval skips missed ticks, and an atomic
/// guard covers the window where a pass outlives its tick. A pass that
/// exceeds the configured deadline is abandoned and the next tick starts
/// fresh.
pub struct AlertMatcherJob {
    service: Arc<AlertMatcherService>,
    config: AlertsConfig,
    running: AtomicBool,
}

impl AlertMatcherJob {
    pub fn new(pool: PgPool, config: AlertsConfig, notifier: Arc<dyn NotificationService>) -> Self {
        Self {
            service: Arc::new(AlertMatcherService::new(
                pool,
                config.clone(),
                notifier,
            )),
            config,
            running: AtomicBool::new(false),
        }
    }
}

#[async_trait::async_trait]
impl Job for AlertMatcherJob {
    fn name(&self) -> &'static str {
        "alert_matcher"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.config.interval_minutes)
    }

    async fn execute(&self) -> Result<(), String> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("Previous alert matcher pass still running, skipping tick");
            return Ok(());
        }

        let deadline = Duration::from_secs(self.config.pass_timeout_secs);
        let result = tokio::time::timeout(deadline, self.service.run_pass()).await;

        self.running.store(false, Ordering::SeqCst);

        match result {
            Ok(Ok(_summary)) => Ok(()),
            Ok(Err(e)) => Err(format!("Pass failed: {e}")),
            Err(_) => Err(format!("Pass exceeded deadline of {deadline:?}")),
        }
    }
}
