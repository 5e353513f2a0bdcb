//! LRU Cache Server - A thread-safe LRU cache with per-entry TTL expiration
//!
//! Serves the cache over HTTP with CORS, a request log file and graceful shutdown.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lru_cache_server::{create_router, AppState, Config, RequestLog};

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache and open the request log
/// 4. Create Axum router with all endpoints
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM, bounded by the shutdown timeout
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lru_cache_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting LRU Cache Server");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: capacity={}, ttl={}ms, port={}, log_file={}",
        config.capacity,
        config.ttl_ms,
        config.server_port,
        config.log_file.display()
    );

    let state = AppState::from_config(&config)
        .await
        .with_context(|| format!("failed to open request log {}", config.log_file.display()))?;
    let request_log = Arc::clone(&state.request_log);
    info!("Cache initialized");

    let app = create_router(state, config.request_timeout());

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not listen on {}", addr))?;
    info!("Server listening on http://{}", addr);
    lifecycle(&request_log, &format!("Server is ready to handle requests at {}", addr)).await;

    // Start server with graceful shutdown
    let (stopping_tx, mut stopping_rx) = watch::channel(false);
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(Arc::clone(&request_log), stopping_tx))
    .into_future();

    let shutdown_timeout = config.shutdown_timeout();
    tokio::select! {
        result = server => result.context("server error")?,
        _ = async {
            if stopping_rx.wait_for(|stopping| *stopping).await.is_err() {
                std::future::pending::<()>().await;
            }
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            warn!("Connections still open after {:?}, forcing shutdown", shutdown_timeout);
        }
    }

    lifecycle(&request_log, "Server stopped").await;
    info!("Server shutdown complete");
    Ok(())
}

/// Writes a lifecycle message to the request log file.
async fn lifecycle(request_log: &RequestLog, message: &str) {
    if let Err(err) = request_log.append(message).await {
        warn!(%err, "failed to write request log");
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// Flags `stopping` once the signal arrives so the drain timeout can start.
async fn shutdown_signal(request_log: Arc<RequestLog>, stopping: watch::Sender<bool>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(%err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    lifecycle(&request_log, "Server is shutting down...").await;
    let _ = stopping.send(true);
}
