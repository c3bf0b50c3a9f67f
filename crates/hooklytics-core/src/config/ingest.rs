//! Event validation configuration.

use serde::{Deserialize, Serialize};

/// Limits applied to inbound event payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// How far into the future an event timestamp may be.
    #[serde(default = "default_max_future_skew")]
    pub max_future_skew_seconds: u64,
    /// Maximum number of events in one request.
    #[serde(default = "default_max_events_per_request")]
    pub max_events_per_request: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_future_skew_seconds: default_max_future_skew(),
            max_events_per_request: default_max_events_per_request(),
        }
    }
}

fn default_max_future_skew() -> u64 {
    300
}

fn default_max_events_per_request() -> usize {
    1000
}
