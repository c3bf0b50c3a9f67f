//! Batch writer counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Monotonic counters updated by the batch writer.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub enqueued: AtomicU64,
    pub rejected: AtomicU64,
    pub written: AtomicU64,
    pub dropped: AtomicU64,
    pub flushes_succeeded: AtomicU64,
    pub flushes_failed: AtomicU64,
    pub retries: AtomicU64,
}

impl Counters {
    pub fn add(counter: &AtomicU64, n: usize) {
        counter.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self, pending: usize) -> WriterStats {
        WriterStats {
            pending,
            enqueued: self.enqueued.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            flushes_succeeded: self.flushes_succeeded.load(Ordering::Relaxed),
            flushes_failed: self.flushes_failed.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the batch writer, reported by the health route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriterStats {
    /// Events waiting for the next flush.
    pub pending: usize,
    /// Events accepted by `enqueue`.
    pub enqueued: u64,
    /// Events refused because the buffer was full.
    pub rejected: u64,
    /// Events confirmed written to the store.
    pub written: u64,
    /// Events discarded after a failed retry.
    pub dropped: u64,
    pub flushes_succeeded: u64,
    pub flushes_failed: u64,
    /// Writes that failed once and were retried.
    pub retries: u64,
}
