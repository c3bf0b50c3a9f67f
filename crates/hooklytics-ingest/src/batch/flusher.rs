//! Background task that flushes the batch writer on its triggers.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use crate::batch::writer::BatchWriter;

/// Drives [`BatchWriter::flush`] from the size and time triggers.
#[derive(Debug, Clone)]
pub struct BatchFlusher {
    writer: Arc<BatchWriter>,
}

impl BatchFlusher {
    pub fn new(writer: Arc<BatchWriter>) -> Self {
        Self { writer }
    }

    /// Run until the cancel signal is received, then drain the batch.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        let config = self.writer.config();
        info!(
            max_size = config.max_size,
            flush_interval_ms = config.flush_interval_ms,
            max_pending = config.max_pending,
            "Batch flusher started"
        );

        loop {
            let deadline = self.writer.deadline().await;
            let interval_elapsed = async {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("Batch flusher received shutdown signal");
                        break;
                    }
                }
                _ = self.writer.changed() => {}
                _ = interval_elapsed => {}
            }

            if self.writer.is_due().await {
                self.flush().await;
            }
        }

        info!("Draining pending events before shutdown");
        self.flush().await;
        info!("Batch flusher shut down complete");
    }

    async fn flush(&self) {
        // Loss is already logged and counted by the writer.
        if let Err(e) = self.writer.flush().await {
            error!(lost = e.lost, "Background flush failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::Utc;
    use hooklytics_core::config::BatchConfig;
    use hooklytics_core::types::{Event, HookType};
    use hooklytics_store::memory::MemoryEventStore;
    use serde_json::Map;

    fn events(count: usize) -> Vec<Event> {
        (0..count)
            .map(|n| Event {
                user_id: "user_1".to_string(),
                website_id: "site_1".to_string(),
                hook_type: HookType::TrackClicks,
                event_type: format!("click_{n}"),
                default_metadata: Map::new(),
                core_metadata: Map::new(),
                element_metadata: None,
                timestamp: Utc::now(),
            })
            .collect()
    }

    fn start(
        store: &MemoryEventStore,
        config: BatchConfig,
    ) -> (
        Arc<BatchWriter>,
        watch::Sender<bool>,
        tokio::task::JoinHandle<()>,
    ) {
        let writer = Arc::new(BatchWriter::new(Arc::new(store.clone()), config));
        let (tx, rx) = watch::channel(false);
        let flusher = BatchFlusher::new(Arc::clone(&writer));
        let handle = tokio::spawn(async move { flusher.run(rx).await });
        (writer, tx, handle)
    }

    async fn wait_for_rows(store: &MemoryEventStore, rows: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while store.len().await < rows {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("rows never reached the store");
    }

    #[tokio::test]
    async fn test_size_trigger_flushes_without_waiting_for_interval() {
        let store = MemoryEventStore::new();
        let (writer, tx, handle) = start(
            &store,
            BatchConfig {
                max_size: 5,
                flush_interval_ms: 60_000,
                ..Default::default()
            },
        );

        writer.enqueue(events(5)).await.unwrap();
        wait_for_rows(&store, 5).await;
        assert_eq!(writer.pending().await, 0);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_time_trigger_flushes_small_batch() {
        let store = MemoryEventStore::new();
        let (writer, tx, handle) = start(
            &store,
            BatchConfig {
                max_size: 100,
                flush_interval_ms: 50,
                ..Default::default()
            },
        );

        writer.enqueue(events(1)).await.unwrap();
        assert!(store.is_empty().await);

        wait_for_rows(&store, 1).await;

        tx.send(true).unwrap();
        handle.await.unwrap();
        assert_eq!(writer.stats().await.flushes_succeeded, 1);
    }

    #[tokio::test]
    async fn test_shutdown_drains_pending_events() {
        let store = MemoryEventStore::new();
        let (writer, tx, handle) = start(
            &store,
            BatchConfig {
                max_size: 100,
                flush_interval_ms: 60_000,
                ..Default::default()
            },
        );

        writer.enqueue(events(7)).await.unwrap();
        tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(store.len().await, 7);
        assert_eq!(writer.pending().await, 0);
    }
}
