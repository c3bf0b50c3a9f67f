//! Wire row for the event table.

use clickhouse::Row;
use serde::Serialize;

use hooklytics_core::types::EventRecord;

/// One row of the event table.
///
/// ```sql
/// CREATE TABLE event_log (
///     userId String,
///     websiteId String,
///     hookType LowCardinality(String),
///     eventType String,
///     defaultMetadata String,
///     coreMetadata String,
///     elementMetadata String,
///     timestamp DateTime64(3)
/// ) ENGINE = MergeTree()
/// PARTITION BY toYYYYMM(timestamp)
/// ORDER BY (websiteId, timestamp);
/// ```
#[derive(Debug, Clone, PartialEq, Row, Serialize)]
pub struct EventLogRow {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "websiteId")]
    pub website_id: String,
    #[serde(rename = "hookType")]
    pub hook_type: String,
    #[serde(rename = "eventType")]
    pub event_type: String,
    /// JSON object as text
    #[serde(rename = "defaultMetadata")]
    pub default_metadata: String,
    /// JSON object as text
    #[serde(rename = "coreMetadata")]
    pub core_metadata: String,
    /// JSON object as text, `{}` when the event had none
    #[serde(rename = "elementMetadata")]
    pub element_metadata: String,
    /// Milliseconds since epoch
    pub timestamp: i64,
}

impl From<&EventRecord> for EventLogRow {
    fn from(record: &EventRecord) -> Self {
        Self {
            user_id: record.user_id.clone(),
            website_id: record.website_id.clone(),
            hook_type: record.hook_type.clone(),
            event_type: record.event_type.clone(),
            default_metadata: record.default_metadata.clone(),
            core_metadata: record.core_metadata.clone(),
            element_metadata: record.element_metadata.clone(),
            timestamp: record.timestamp.timestamp_millis(),
        }
    }
}
