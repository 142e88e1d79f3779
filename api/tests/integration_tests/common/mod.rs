//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality used across all integration tests,
//! including test app setup and HTTP request helpers.

use api::{create_router, AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use shared::chrono::{DateTime, Utc};
use shared::engine::{FixedClock, MetricsEngine};
use shared::notify::InMemoryNotifier;
use shared::storage::InMemoryReportStore;
use std::sync::Arc;

/// Instant every test engine reports as "now".
pub const FIXED_NOW: &str = "2024-03-01T08:15:30Z";

/// Collaborators behind a test router, kept for assertions.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<InMemoryReportStore>,
    pub notifier: Arc<InMemoryNotifier>,
}

/// Engine with a fixed clock.
pub fn fixed_engine() -> MetricsEngine {
    let now: DateTime<Utc> = FIXED_NOW.parse().unwrap();
    MetricsEngine::new().with_clock(Arc::new(FixedClock(now)))
}

/// Creates a test router with a fresh in-memory store and no notifier.
pub fn test_app() -> (Router, AppState) {
    let state = AppState::new(fixed_engine(), InMemoryReportStore::new_shared());
    let router = create_router(state.clone());
    (router, state)
}

/// Creates a test app whose state is customised by `configure`.
///
/// An in-memory notifier is always attached.
pub fn test_app_with(configure: impl FnOnce(AppState) -> AppState) -> TestApp {
    let store = InMemoryReportStore::new_shared();
    let notifier = Arc::new(InMemoryNotifier::new());
    let state = configure(
        AppState::new(fixed_engine(), store.clone()).with_notifier(notifier.clone(), None),
    );
    let router = create_router(state.clone());
    TestApp {
        router,
        state,
        store,
        notifier,
    }
}

/// A valid male submission.
pub fn male_submission() -> Value {
    json!({
        "name": "Alex Smith",
        "email": "alex@example.com",
        "sex": "male",
        "height_cm": 180,
        "weight_lbs": 160,
        "waist_cm": 85,
        "neck_cm": 38
    })
}

/// A valid female submission without email.
pub fn female_submission() -> Value {
    json!({
        "name": "Kim",
        "sex": "Female",
        "height_cm": 165,
        "weight_lbs": 130,
        "waist_cm": 70,
        "neck_cm": 32
    })
}

/// Helper to make a POST request with JSON body.
///
/// # Arguments
///
/// * `app` - The Axum router to send the request to
/// * `uri` - The URI path to POST to
/// * `body` - The JSON body to send
///
/// # Returns
///
/// A tuple containing the response status code and parsed JSON response body.
pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}

/// Helper to make a GET request, returning the status and raw body text.
pub async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();

    (status, String::from_utf8_lossy(&body_bytes).into_owned())
}

/// Helper to make a GET request.
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, text) = get_text(app, uri).await;
    (status, serde_json::from_str(&text).unwrap_or(Value::Null))
}
