//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! `config/default.toml`, an environment overlay, and `HOOKLYTICS__*`
//! environment variables. Every field has a default so the service can
//! boot from environment variables alone.

pub mod auth;
pub mod batch;
pub mod ingest;
pub mod logging;
pub mod server;
pub mod store;

use serde::{Deserialize, Serialize};

pub use self::auth::AuthConfig;
pub use self::batch::BatchConfig;
pub use self::ingest::IngestConfig;
pub use self::logging::LoggingConfig;
pub use self::server::{CorsConfig, ServerConfig};
pub use self::store::{ClickHouseConfig, StoreConfig};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Token verification settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Analytics store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Batch writer settings.
    #[serde(default)]
    pub batch: BatchConfig,
    /// Event validation settings.
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files and the environment.
    ///
    /// Sources, later ones overriding earlier ones:
    /// `config/default.toml`, `config/{env}.toml`, then variables such as
    /// `HOOKLYTICS__STORE__CLICKHOUSE__PASSWORD`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("HOOKLYTICS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.batch.max_size == 0 {
            return Err(AppError::configuration("batch.max_size must be at least 1"));
        }
        if self.batch.max_pending < self.batch.max_size {
            return Err(AppError::configuration(format!(
                "batch.max_pending ({}) must be >= batch.max_size ({})",
                self.batch.max_pending, self.batch.max_size
            )));
        }
        if self.batch.flush_interval_ms == 0 {
            return Err(AppError::configuration(
                "batch.flush_interval_ms must be greater than zero",
            ));
        }
        let skew_in_range = i64::try_from(self.ingest.max_future_skew_seconds)
            .ok()
            .and_then(chrono::TimeDelta::try_seconds)
            .is_some();
        if !skew_in_range {
            return Err(AppError::configuration(format!(
                "ingest.max_future_skew_seconds ({}) is out of range",
                self.ingest.max_future_skew_seconds
            )));
        }
        let has_secret = self
            .auth
            .jwt_secret
            .as_deref()
            .is_some_and(|s| !s.is_empty());
        if !has_secret && self.auth.jwks_url.trim().is_empty() {
            return Err(AppError::configuration(
                "either auth.jwks_url or auth.jwt_secret must be set",
            ));
        }
        Ok(())
    }
}
