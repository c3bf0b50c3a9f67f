//! In-memory event store.
//!
//! Keeps appended rows in a vector behind a lock. Besides serving local
//! runs, it can be told to fail or stall writes so the batch writer's
//! retry and timeout paths are testable.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use hooklytics_core::traits::{EventStore, StoreError};
use hooklytics_core::types::EventRecord;

/// In-memory store provider.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventStore {
    /// Rows appended so far, in write order.
    records: Arc<RwLock<Vec<EventRecord>>>,
    /// Number of upcoming `append_batch` calls that should fail.
    fail_next: Arc<AtomicUsize>,
    /// Artificial latency added to every write.
    delay: Arc<RwLock<Option<Duration>>>,
    /// Total `append_batch` invocations, including failed ones.
    attempts: Arc<AtomicUsize>,
    /// Reported by `health_check`.
    unhealthy: Arc<AtomicBool>,
}

impl MemoryEventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every row appended so far.
    pub async fn records(&self) -> Vec<EventRecord> {
        self.records.read().await.clone()
    }

    /// Number of rows appended so far.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether no rows have been appended.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Make the next `count` writes fail.
    pub fn fail_next(&self, count: usize) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    /// Delay every subsequent write by `delay`.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().await = delay;
    }

    /// Mark the store as unreachable for health checks.
    pub fn set_healthy(&self, healthy: bool) {
        self.unhealthy.store(!healthy, Ordering::SeqCst);
    }

    /// Total write attempts, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn append_batch(&self, records: &[EventRecord]) -> Result<(), StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let should_fail = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(StoreError::WriteFailed("injected failure".to_string()));
        }

        // One lock acquisition keeps the batch all-or-nothing for readers.
        self.records.write().await.extend_from_slice(records);
        debug!(rows = records.len(), "Batch appended to memory store");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(!self.unhealthy.load(Ordering::SeqCst))
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
