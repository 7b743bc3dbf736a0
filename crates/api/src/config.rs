use serde::Deserialize;
use std::net::SocketAddr;

pub use persistence::db::DatabaseConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    /// Alert matcher job configuration
    pub alerts: AlertsConfig,
    /// Push notification (FCM) configuration
    #[serde(default)]
    pub fcm: FcmConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Alert matcher job configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertsConfig {
    /// Whether the periodic matcher runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minutes between matcher passes.
    #[serde(default = "default_alert_interval")]
    pub interval_minutes: u64,

    /// Minimum minutes between notifications for one alert.
    #[serde(default = "default_alert_cooldown")]
    pub cooldown_minutes: u32,

    /// How many alerts are evaluated concurrently within a pass.
    #[serde(default = "default_worker_concurrency")]
    pub worker_concurrency: usize,

    /// Upper bound on one matcher pass; a pass exceeding it is abandoned.
    #[serde(default = "default_pass_timeout")]
    pub pass_timeout_secs: u64,

    /// Maximum due alerts picked up per pass.
    #[serde(default = "default_alert_batch_size")]
    pub batch_size: u32,
}

/// Firebase Cloud Messaging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FcmConfig {
    /// Whether real FCM sending is enabled.
    #[serde(default)]
    pub enabled: bool,

    /// Firebase project ID.
    #[serde(default)]
    pub project_id: String,

    /// Service account credentials: inline JSON or a file path.
    #[serde(default)]
    pub credentials: String,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_fcm_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries on transient provider errors.
    #[serde(default = "default_fcm_max_retries")]
    pub max_retries: u32,

    /// Whether to request high delivery priority.
    #[serde(default = "default_true")]
    pub high_priority: bool,
}

impl Default for FcmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            project_id: String::new(),
            credentials: String::new(),
            timeout_ms: default_fcm_timeout_ms(),
            max_retries: default_fcm_max_retries(),
            high_priority: true,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_true() -> bool {
    true
}
fn default_alert_interval() -> u64 {
    5
}
fn default_alert_cooldown() -> u32 {
    60
}
fn default_worker_concurrency() -> usize {
    8
}
fn default_pass_timeout() -> u64 {
    240
}
fn default_alert_batch_size() -> u32 {
    500
}
fn default_fcm_timeout_ms() -> u64 {
    10000
}
fn default_fcm_max_retries() -> u32 {
    3
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with MP__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("MP").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Creates a config entirely from defaults and overrides, without
    /// relying on config files (which may not be accessible during tests).
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [database]
            url = "postgres://localhost/marketplace_test"
            max_connections = 5
            min_connections = 1
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []

            [alerts]
            enabled = true
            interval_minutes = 5
            cooldown_minutes = 60
            worker_concurrency = 8
            pass_timeout_secs = 240
            batch_size = 500

            [fcm]
            enabled = false
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Validate configuration invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "database.url".to_string(),
            ));
        }
        if self.alerts.interval_minutes == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "alerts.interval_minutes must be positive".to_string(),
            ));
        }
        if self.alerts.worker_concurrency == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "alerts.worker_concurrency must be positive".to_string(),
            ));
        }
        if self.alerts.batch_size == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "alerts.batch_size must be positive".to_string(),
            ));
        }
        if self.fcm.enabled {
            if self.fcm.project_id.is_empty() {
                return Err(ConfigValidationError::MissingRequired(
                    "fcm.project_id".to_string(),
                ));
            }
            if self.fcm.credentials.is_empty() {
                return Err(ConfigValidationError::MissingRequired(
                    "fcm.credentials".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Socket address the server binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], self.server.port)))
    }
}
