//! `EventStore` implementation over ClickHouse.

use async_trait::async_trait;
use tracing::debug;

use hooklytics_core::traits::{EventStore, StoreError};
use hooklytics_core::types::EventRecord;

use super::connection::ClickHouseConnection;
use super::row::EventLogRow;

/// Appends event batches to a ClickHouse table.
///
/// Each batch is sent as a single `INSERT`, which ClickHouse applies
/// atomically for inserts that fit in one block.
#[derive(Debug, Clone)]
pub struct ClickHouseEventStore {
    connection: ClickHouseConnection,
    table: String,
}

impl ClickHouseEventStore {
    /// Create a store writing to `table`.
    pub fn new(connection: ClickHouseConnection, table: impl Into<String>) -> Self {
        Self {
            connection,
            table: table.into(),
        }
    }
}

#[async_trait]
impl EventStore for ClickHouseEventStore {
    async fn append_batch(&self, records: &[EventRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut insert = self
            .connection
            .client()
            .insert::<EventLogRow>(&self.table)
            .map_err(|e| StoreError::WriteFailed(format!("failed to start insert: {e}")))?;

        for record in records {
            insert
                .write(&EventLogRow::from(record))
                .await
                .map_err(|e| StoreError::WriteFailed(format!("failed to write row: {e}")))?;
        }

        insert
            .end()
            .await
            .map_err(|e| StoreError::WriteFailed(format!("insert into {} failed: {e}", self.table)))?;

        debug!(table = %self.table, rows = records.len(), "Batch inserted");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        self.connection.health_check().await
    }

    fn provider_name(&self) -> &'static str {
        "clickhouse"
    }
}
