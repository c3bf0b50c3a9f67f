//! Buffers validated events and appends them to the store in batches.
//!
//! The buffer lock is only held to push or swap events. A flush takes the
//! whole buffer, releases the lock, and writes without it, so producers
//! never wait on the store. A second lock keeps at most one flush in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use hooklytics_core::config::BatchConfig;
use hooklytics_core::traits::{EventStore, StoreError};
use hooklytics_core::types::{Event, EventRecord};

use crate::batch::stats::{Counters, WriterStats};
use crate::error::{FlushError, IngestError};

#[derive(Debug, Default)]
struct Batch {
    events: Vec<Event>,
    /// When the oldest pending event arrived.
    first_enqueued_at: Option<Instant>,
}

/// Outcome of a successful flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    /// Events written by this flush.
    pub written: usize,
    /// Whether the first attempt failed and the retry succeeded.
    pub retried: bool,
}

/// Owns the pending batch and writes it to an [`EventStore`].
#[derive(Debug)]
pub struct BatchWriter {
    store: Arc<dyn EventStore>,
    config: BatchConfig,
    batch: Mutex<Batch>,
    flush_lock: Mutex<()>,
    wake: Notify,
    counters: Counters,
}

impl BatchWriter {
    pub fn new(store: Arc<dyn EventStore>, config: BatchConfig) -> Self {
        Self {
            store,
            config,
            batch: Mutex::new(Batch::default()),
            flush_lock: Mutex::new(()),
            wake: Notify::new(),
            counters: Counters::default(),
        }
    }

    /// Append events to the pending batch.
    ///
    /// Returns immediately; durability is up to the next flush. The whole
    /// set is refused if it would push the batch past `max_pending`.
    pub async fn enqueue(&self, events: Vec<Event>) -> Result<usize, IngestError> {
        let count = events.len();
        if count == 0 {
            return Ok(0);
        }

        let mut batch = self.batch.lock().await;
        let pending = batch.events.len();
        if pending + count > self.config.max_pending {
            Counters::add(&self.counters.rejected, count);
            warn!(
                pending,
                incoming = count,
                capacity = self.config.max_pending,
                "Event buffer full, rejecting request"
            );
            return Err(IngestError::BufferFull {
                pending,
                capacity: self.config.max_pending,
            });
        }

        batch.first_enqueued_at.get_or_insert_with(Instant::now);
        batch.events.extend(events);
        let size = batch.events.len();
        drop(batch);

        Counters::add(&self.counters.enqueued, count);
        // The flusher re-arms its timer on a new batch and flushes on a full one.
        if pending == 0 || size >= self.config.max_size {
            self.wake.notify_one();
        }

        debug!(count, pending = size, "Events enqueued");
        Ok(count)
    }

    /// Write everything pending as one batch.
    ///
    /// A failed write is retried once after the configured backoff. If
    /// the retry fails too the batch is dropped and the error reports how
    /// many events were lost.
    pub async fn flush(&self) -> Result<FlushReport, FlushError> {
        let _in_flight = self.flush_lock.lock().await;

        let events = {
            let mut batch = self.batch.lock().await;
            batch.first_enqueued_at = None;
            std::mem::take(&mut batch.events)
        };

        if events.is_empty() {
            return Ok(FlushReport {
                written: 0,
                retried: false,
            });
        }

        let count = events.len();
        let records = match events.iter().map(EventRecord::encode).collect::<Result<Vec<_>, _>>() {
            Ok(records) => records,
            Err(e) => {
                return Err(self.record_loss(count, StoreError::Encoding(e.to_string())));
            }
        };
        drop(events);

        let started = Instant::now();
        let first = self.write(&records).await;
        let (result, retried) = match first {
            Ok(()) => (Ok(()), false),
            Err(e) => {
                warn!(
                    rows = count,
                    error = %e,
                    backoff_ms = self.config.retry_backoff_ms,
                    "Batch write failed, retrying once"
                );
                Counters::add(&self.counters.retries, 1);
                tokio::time::sleep(self.config.retry_backoff()).await;
                (self.write(&records).await, true)
            }
        };

        match result {
            Ok(()) => {
                Counters::add(&self.counters.written, count);
                Counters::add(&self.counters.flushes_succeeded, 1);
                info!(
                    rows = count,
                    retried,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Batch flushed"
                );
                Ok(FlushReport {
                    written: count,
                    retried,
                })
            }
            Err(e) => Err(self.record_loss(count, e)),
        }
    }

    /// Number of events waiting for the next flush.
    pub async fn pending(&self) -> usize {
        self.batch.lock().await.events.len()
    }

    /// Counter snapshot.
    pub async fn stats(&self) -> WriterStats {
        let pending = self.pending().await;
        self.counters.snapshot(pending)
    }

    /// The configured flush triggers.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// When the time trigger fires for the current batch, if it has events.
    pub(crate) async fn deadline(&self) -> Option<Instant> {
        let batch = self.batch.lock().await;
        batch
            .first_enqueued_at
            .map(|first| first + self.config.flush_interval())
    }

    /// Whether either flush trigger has been reached.
    pub(crate) async fn is_due(&self) -> bool {
        let batch = self.batch.lock().await;
        if batch.events.len() >= self.config.max_size {
            return true;
        }
        batch
            .first_enqueued_at
            .is_some_and(|first| first.elapsed() >= self.config.flush_interval())
    }

    /// Resolves after an enqueue started a new batch or filled it to `max_size`.
    pub(crate) async fn changed(&self) {
        self.wake.notified().await;
    }

    async fn write(&self, records: &[EventRecord]) -> Result<(), StoreError> {
        let limit: Duration = self.config.write_timeout();
        match tokio::time::timeout(limit, self.store.append_batch(records)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(limit)),
        }
    }

    fn record_loss(&self, lost: usize, source: StoreError) -> FlushError {
        Counters::add(&self.counters.dropped, lost);
        Counters::add(&self.counters.flushes_failed, 1);
        error!(lost, error = %source, "Dropping batch after failed write");
        FlushError { lost, source }
    }
}
