//! Store manager that dispatches to the configured provider.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use hooklytics_core::config::StoreConfig;
use hooklytics_core::error::AppError;
use hooklytics_core::result::AppResult;
use hooklytics_core::traits::{EventStore, StoreError};
use hooklytics_core::types::EventRecord;

/// Store manager that wraps the configured analytics store.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StoreManager {
    /// The inner store provider.
    inner: Arc<dyn EventStore>,
}

impl StoreManager {
    /// Create a store manager from configuration.
    ///
    /// With `ensure_schema` set, the ClickHouse provider creates the event
    /// table before returning.
    pub async fn new(config: &StoreConfig) -> AppResult<Self> {
        let inner: Arc<dyn EventStore> = match config.provider.as_str() {
            #[cfg(feature = "clickhouse-backend")]
            "clickhouse" => {
                info!("Initializing ClickHouse store provider");
                let connection = crate::clickhouse::ClickHouseConnection::connect(&config.clickhouse);
                if config.ensure_schema {
                    crate::clickhouse::ensure_schema(&connection, &config.clickhouse.table).await?;
                }
                Arc::new(crate::clickhouse::ClickHouseEventStore::new(
                    connection,
                    config.clickhouse.table.clone(),
                ))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory store provider");
                Arc::new(crate::memory::MemoryEventStore::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown store provider: '{other}'. Supported: clickhouse, memory"
                )));
            }
        };

        Ok(Self { inner })
    }
}

#[async_trait]
impl EventStore for StoreManager {
    async fn append_batch(&self, records: &[EventRecord]) -> Result<(), StoreError> {
        self.inner.append_batch(records).await
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        self.inner.health_check().await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_provider_is_selected() {
        let config = StoreConfig {
            provider: "memory".to_string(),
            ..Default::default()
        };
        let manager = StoreManager::new(&config).await.unwrap();
        assert_eq!(manager.provider_name(), "memory");
    }

    #[tokio::test]
    async fn test_unknown_provider_is_rejected() {
        let config = StoreConfig {
            provider: "postgres".to_string(),
            ..Default::default()
        };
        let err = StoreManager::new(&config).await.unwrap_err();
        assert!(err.to_string().contains("Unknown store provider"));
    }
}
