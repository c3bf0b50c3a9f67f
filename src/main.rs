//! Hooklytics Server: event ingestion for the tracking hooks.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use hooklytics_auth::{HttpKeySetFetcher, KeySetFetcher, StaticKeySetFetcher};
use hooklytics_core::config::AppConfig;
use hooklytics_core::error::AppError;
use hooklytics_store::StoreManager;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("HOOKLYTICS_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Hooklytics v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Analytics store ──────────────────────────────────
    tracing::info!("Initializing store (provider: {})...", config.store.provider);
    let store = Arc::new(StoreManager::new(&config.store).await?);
    match hooklytics_core::traits::EventStore::health_check(store.as_ref()).await {
        Ok(true) => tracing::info!("Analytics store reachable"),
        Ok(false) | Err(_) => {
            tracing::warn!("Analytics store not reachable yet, events will be retried per batch")
        }
    }

    // ── Step 2: Key set source ───────────────────────────────────
    let fetcher: Arc<dyn KeySetFetcher> = match config.auth.jwt_secret.as_deref() {
        Some(secret) if !secret.is_empty() => {
            tracing::info!("Verifying tokens with the configured shared secret");
            Arc::new(StaticKeySetFetcher::from_secret(None, secret.as_bytes()))
        }
        _ => {
            tracing::info!("Verifying tokens against JWKS at {}", config.auth.jwks_url);
            Arc::new(HttpKeySetFetcher::new(Duration::from_secs(
                config.auth.fetch_timeout_seconds,
            ))?)
        }
    };

    // ── Step 3: Pipeline ─────────────────────────────────────────
    let shutdown_grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let pipeline = hooklytics_api::build_pipeline(config, store, fetcher);

    // ── Step 4: Shutdown channel & flusher ───────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let flusher = pipeline.flusher;
    let flusher_handle = tokio::spawn(async move {
        flusher.run(shutdown_rx).await;
    });

    // ── Step 5: HTTP server ──────────────────────────────────────
    let app = hooklytics_api::build_router(pipeline.state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Hooklytics listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    let served = server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)));

    // ── Step 6: Drain pending events ─────────────────────────────
    tracing::info!("Flushing pending events...");
    let _ = shutdown_tx.send(true);
    if tokio::time::timeout(shutdown_grace, flusher_handle).await.is_err() {
        tracing::warn!(
            "Pending events were not flushed within {}s",
            shutdown_grace.as_secs()
        );
    }

    tracing::info!("Hooklytics shut down");
    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
