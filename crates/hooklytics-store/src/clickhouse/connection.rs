//! ClickHouse HTTP client management.

use clickhouse::{Client, Compression};
use tracing::info;

use hooklytics_core::config::ClickHouseConfig;
use hooklytics_core::traits::StoreError;

/// Wrapper around the ClickHouse HTTP client.
///
/// The client is cheap to clone and pools connections internally.
#[derive(Clone)]
pub struct ClickHouseConnection {
    /// The underlying ClickHouse client.
    client: Client,
    /// Target database, kept for logging.
    database: String,
}

impl std::fmt::Debug for ClickHouseConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickHouseConnection")
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

impl ClickHouseConnection {
    /// Build a client from configuration.
    ///
    /// No request is made here; use [`Self::health_check`] to verify reachability.
    pub fn connect(config: &ClickHouseConfig) -> Self {
        info!(
            url = %config.url(),
            database = %config.database,
            username = %config.username,
            password = %mask_password(&config.password),
            compression = config.compression,
            "Configuring ClickHouse client"
        );

        let compression = if config.compression {
            Compression::Lz4
        } else {
            Compression::None
        };

        let client = Client::default()
            .with_url(config.url())
            .with_user(&config.username)
            .with_password(&config.password)
            .with_database(&config.database)
            .with_compression(compression)
            .with_option(
                "max_execution_time",
                config.max_execution_time_seconds.to_string(),
            );

        Self {
            client,
            database: config.database.clone(),
        }
    }

    /// Return a reference to the underlying client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Check that the server answers a trivial query.
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        self.client
            .query("SELECT 1")
            .fetch_one::<u8>()
            .await
            .map(|v| v == 1)
            .map_err(|e| StoreError::ConnectionFailed(format!("health check failed: {e}")))
    }
}

/// Mask a password for safe logging.
fn mask_password(password: &str) -> &'static str {
    if password.is_empty() { "<empty>" } else { "****" }
}
