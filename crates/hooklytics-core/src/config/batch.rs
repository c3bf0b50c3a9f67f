//! Batch writer configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Controls when the batch writer flushes and how it handles failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Flush as soon as this many events are pending.
    #[serde(default = "default_max_size")]
    pub max_size: usize,
    /// Flush this long after the first event of a batch was enqueued.
    #[serde(default = "default_flush_interval")]
    pub flush_interval_ms: u64,
    /// Upper bound on pending events; enqueues beyond it are rejected.
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,
    /// Delay before the single retry of a failed write.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
    /// Upper bound on one store write.
    #[serde(default = "default_write_timeout")]
    pub write_timeout_seconds: u64,
}

impl BatchConfig {
    /// Flush interval as a `Duration`.
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// Retry backoff as a `Duration`.
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Write timeout as a `Duration`.
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_seconds)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            flush_interval_ms: default_flush_interval(),
            max_pending: default_max_pending(),
            retry_backoff_ms: default_retry_backoff(),
            write_timeout_seconds: default_write_timeout(),
        }
    }
}

fn default_max_size() -> usize {
    500
}

fn default_flush_interval() -> u64 {
    5000
}

fn default_max_pending() -> usize {
    50_000
}

fn default_retry_backoff() -> u64 {
    500
}

fn default_write_timeout() -> u64 {
    30
}
