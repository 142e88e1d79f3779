//! Measurement submission endpoint.

use crate::error::ApiError;
use crate::rate_limit::limit_submissions;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    middleware,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::models::{MeasurementInput, Metrics};
use shared::notify::Notification;
use shared::report::{render_report, report_subject};
use shared::storage::sanitize_identifier;

/// Response for a successful submission. Only the metrics are exposed.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Always `true`.
    pub success: bool,
    /// The computed metrics.
    pub data: Metrics,
}

/// Creates the submission routes, rate limited when the state carries a limiter.
pub fn submit_routes(state: AppState) -> Router {
    Router::new()
        .route("/submit", post(submit))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            limit_submissions,
        ))
        .with_state(state)
}

async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<MeasurementInput>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::InvalidPayload(e.body_text()))?;

    let record = state.engine().compute(input).inspect_err(|e| {
        tracing::info!(code = e.code(), reason = %e, "Submission rejected");
    })?;

    let identifier = sanitize_identifier(&record.name);
    let report = render_report(&record);
    let location = state.report_store().save(&record, &report).await?;

    tracing::info!(
        submitter = %identifier,
        category = %record.metrics.bmi_category,
        %location,
        "Report stored"
    );

    if let Some(notifier) = state.notifier() {
        match state.recipient(record.email.as_deref()) {
            Some(to) => {
                let notification = Notification::new(to, report_subject(&record), report);
                notifier.notify(&notification).await?;
                tracing::info!(submitter = %identifier, "Report delivered");
            }
            None => {
                tracing::debug!(submitter = %identifier, "No recipient, skipping delivery");
            }
        }
    }

    Ok(Json(SubmitResponse {
        success: true,
        data: record.metrics,
    }))
}
