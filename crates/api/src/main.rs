use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use domain::services::{MockNotificationService, NotificationService};
use tracing::{info, warn};

mod app;
mod config;
mod error;
mod extractors;
mod jobs;
mod middleware;
mod routes;
mod services;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging
    middleware::logging::init_logging(&config.logging);

    info!("Starting Marketplace API v{}", env!("CARGO_PKG_VERSION"));

    // Create database pool
    let pool = persistence::db::create_pool(&config.database).await?;

    // Run migrations
    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    // Pick the push sender: FCM when configured, mock otherwise
    let notifier: Arc<dyn NotificationService> = if config.fcm.enabled {
        Arc::new(services::fcm::FcmNotificationService::new(
            config.fcm.clone(),
        )?)
    } else {
        warn!("FCM disabled; push notifications are logged, not sent");
        Arc::new(MockNotificationService::new())
    };

    // Start background jobs
    let mut scheduler = jobs::JobScheduler::new();
    if config.alerts.enabled {
        scheduler.register(jobs::AlertMatcherJob::new(
            pool.clone(),
            config.alerts.clone(),
            Arc::clone(&notifier),
        ));
    }
    scheduler.start();

    // Build application
    let app = app::create_app(config.clone(), pool);

    // Start server
    let addr = config.socket_addr();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
