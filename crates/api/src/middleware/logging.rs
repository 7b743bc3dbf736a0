//! Logging initialization and configuration.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Initializes the logging subsystem based on configuration.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies to this
/// service while the chatty infrastructure crates stay at warn.
pub fn init_logging(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.format == "json" {
        let json_layer = fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_target(true);
        registry.with(json_layer).init();
    } else {
        let compact_layer = fmt::layer().compact().with_target(true);
        registry.with(compact_layer).init();
    }
}

fn default_directives(level: &str) -> String {
    format!("{level},sqlx=warn,hyper=warn,reqwest=warn")
}
