//! Health check endpoint.
//!
//! Reports liveness together with the optional collaborators this deployment
//! was started with.

use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use shared::engine::EmailPolicy;

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status (always "healthy" if reachable).
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Features enabled by configuration.
    pub features: Features,
}

/// Optional behaviour enabled in this deployment.
#[derive(Debug, Serialize, Deserialize)]
pub struct Features {
    /// Submissions must include an email address.
    pub email_required: bool,
    /// Reports are delivered after being stored.
    pub notifications: bool,
    /// Submissions are rate limited per client.
    pub rate_limiting: bool,
}

/// Creates the health check routes.
pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "fitreport-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        features: Features {
            email_required: state.engine().email_policy() == EmailPolicy::Required,
            notifications: state.notifier().is_some(),
            rate_limiting: state.rate_limiter().is_some(),
        },
    })
}
