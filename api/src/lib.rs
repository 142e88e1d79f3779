//! Fitreport API Server
//!
//! This crate provides the HTTP server accepting body measurement submissions.
//! Each submission is validated and turned into a metrics record, stored as a
//! per-user report, and optionally delivered by mail.
//!
//! # Architecture
//!
//! The API server is built on Axum and Tokio, providing:
//! - `POST /submit` for measurement submissions
//! - `GET /health` for load balancers and monitoring
//! - Static files for the submission form
//!
//! # Example
//!
//! ```no_run
//! use api::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod error;
mod rate_limit;
mod routes;
mod state;

pub use config::{Config, MailConfig, RateLimitConfig};
pub use error::{ApiError, ErrorBody};
pub use rate_limit::RateLimiter;
pub use routes::{Features, HealthResponse, SubmitResponse};
pub use state::AppState;

use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 16 * 1024;

/// Interval between sweeps of idle rate limit buckets.
const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Runs the fitreport API server.
///
/// This function initializes the server with configuration from environment variables
/// and starts listening for incoming connections. It handles graceful shutdown on
/// SIGTERM/SIGINT signals.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server() -> Result<()> {
    let config = Config::from_env()?;
    run_server_with_config(config).await
}

/// Runs the fitreport API server with the provided configuration.
///
/// # Errors
///
/// Returns an error if:
/// - The mail relay client cannot be created
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config) -> Result<()> {
    let addr = config.socket_addr()?;

    tracing::info!(
        host = %config.host,
        port = %config.port,
        data_dir = %config.data_dir.display(),
        storage_format = ?config.storage_format,
        require_email = config.require_email,
        notifications = config.mail.is_some(),
        rate_limiting = config.rate_limit.is_some(),
        "Fitreport API server starting"
    );

    let state = AppState::from_config(&config)?;
    if state.rate_limiter().is_some() {
        spawn_limiter_pruning(state.clone());
    }

    let app = with_static_files(create_router(state), &config.public_dir);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Listening for connections");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Creates the main application router with all routes and middleware.
///
/// This function is public to allow testing the router without starting a full server.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes(state.clone()))
        .merge(routes::submit_routes(state))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}

/// Serves files from `dir` for every path no route matches.
pub fn with_static_files(router: Router, dir: &Path) -> Router {
    router.fallback_service(ServeDir::new(dir))
}

fn spawn_limiter_pruning(state: AppState) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            ticker.tick().await;
            if let Some(limiter) = state.rate_limiter() {
                limiter.prune();
                tracing::trace!(clients = limiter.tracked_clients(), "Pruned rate limit buckets");
            }
        }
    });
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
