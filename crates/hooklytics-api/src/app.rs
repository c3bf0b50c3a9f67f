//! Wires configuration, the key set source, and the store into an `AppState`.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use hooklytics_auth::{KeySetCache, KeySetFetcher, TokenVerifier};
use hooklytics_core::config::AppConfig;
use hooklytics_core::traits::EventStore;
use hooklytics_ingest::{BatchFlusher, BatchWriter, EventValidator};

use crate::state::AppState;

/// Everything the server needs besides the listener.
#[derive(Debug)]
pub struct Pipeline {
    /// State handed to the router.
    pub state: AppState,
    /// Background flusher; the caller spawns it with a shutdown receiver.
    pub flusher: BatchFlusher,
}

/// Build the auth → validate → batch → store pipeline.
pub fn build_pipeline(
    config: AppConfig,
    store: Arc<dyn EventStore>,
    fetcher: Arc<dyn KeySetFetcher>,
) -> Pipeline {
    let key_sets = Arc::new(KeySetCache::new(fetcher, &config.auth));
    let verifier = Arc::new(TokenVerifier::new(key_sets, &config.auth));
    let validator = Arc::new(EventValidator::new(&config.ingest));
    let writer = Arc::new(BatchWriter::new(Arc::clone(&store), config.batch.clone()));
    let flusher = BatchFlusher::new(Arc::clone(&writer));

    info!(
        store = store.provider_name(),
        jwks_url = %config.auth.jwks_url,
        "Ingestion pipeline assembled"
    );

    let state = AppState {
        config: Arc::new(config),
        verifier,
        validator,
        writer,
        store,
        started_at: Instant::now(),
    };

    Pipeline { state, flusher }
}
