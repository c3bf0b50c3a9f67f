//! Event table bootstrap.

use tracing::info;

use hooklytics_core::traits::StoreError;

use super::connection::ClickHouseConnection;

/// DDL for the event table. Column names are the ones dashboards query.
pub fn event_table_ddl(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
    userId String,
    websiteId String,
    hookType LowCardinality(String),
    eventType String,
    defaultMetadata String,
    coreMetadata String,
    elementMetadata String,
    timestamp DateTime64(3)
) ENGINE = MergeTree()
PARTITION BY toYYYYMM(timestamp)
ORDER BY (websiteId, timestamp)"
    )
}

/// Create the event table if it does not exist yet.
pub async fn ensure_schema(connection: &ClickHouseConnection, table: &str) -> Result<(), StoreError> {
    info!(table, "Ensuring event table exists");

    connection
        .client()
        .query(&event_table_ddl(table))
        .execute()
        .await
        .map_err(|e| StoreError::ConnectionFailed(format!("failed to create table {table}: {e}")))?;

    info!(table, "Event table ready");
    Ok(())
}
