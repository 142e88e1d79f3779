//! Integration tests for the submission endpoint.
//!
//! Tests cover:
//! - Successful submissions and the metrics-only response
//! - Validation failures and their error codes
//! - Report storage and delivery
//! - Email requirement and rate limiting

use api::{RateLimitConfig, RateLimiter};
use axum::http::StatusCode;
use serde_json::json;
use shared::engine::EmailPolicy;
use std::sync::Arc;
use std::time::Duration;

use super::common::{
    female_submission, fixed_engine, male_submission, post_json, test_app, test_app_with,
};

#[tokio::test]
async fn test_male_submission_metrics() {
    let (app, _state) = test_app();

    let (status, response) = post_json(app, "/submit", male_submission()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["success"], true);
    let data = &response["data"];
    assert_eq!(data["bmi"], 22.4);
    assert_eq!(data["bmi_category"], "Normal");
    assert_eq!(data["waist_height_ratio"], 0.47);
    assert_eq!(data["body_fat_percentage"], 22.62);
}

#[tokio::test]
async fn test_female_submission_has_null_body_fat() {
    let (app, _state) = test_app();

    let (status, response) = post_json(app, "/submit", female_submission()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(response["data"]["body_fat_percentage"].is_null());
    assert_eq!(response["data"]["bmi"], 21.66);
}

#[tokio::test]
async fn test_response_exposes_only_metrics() {
    let (app, _state) = test_app();

    let (_, response) = post_json(app, "/submit", male_submission()).await;

    let keys: Vec<&String> = response["data"].as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 4);
    assert!(response.get("name").is_none());
    assert!(response["data"].get("weight_kg").is_none());
}

#[tokio::test]
async fn test_uppercase_sex_is_accepted() {
    let (app, _state) = test_app();
    let mut body = male_submission();
    body["sex"] = json!("MALE");

    let (status, _) = post_json(app, "/submit", body).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_validation_error_codes() {
    let cases = [
        ("sex", json!(null), "missing_field"),
        ("name", json!(""), "missing_field"),
        ("email", json!("not-an-email"), "invalid_email"),
        ("sex", json!("other"), "invalid_sex"),
        ("height_cm", json!(0), "invalid_measurement"),
        ("weight_lbs", json!(-150), "invalid_measurement"),
        ("height_cm", json!(1e-200), "invalid_measurement"),
        ("weight_lbs", json!(1e307), "invalid_measurement"),
        ("neck_cm", json!(90), "undefined_body_fat"),
    ];

    for (field, value, code) in cases {
        let (app, _state) = test_app();
        let mut body = male_submission();
        body[field] = value;

        let (status, response) = post_json(app, "/submit", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{field}");
        assert_eq!(response["success"], false, "{field}");
        assert_eq!(response["error"], code, "{field}");
        assert!(response["message"].is_string(), "{field}");
    }
}

#[tokio::test]
async fn test_missing_sex_message() {
    let (app, _state) = test_app();
    let mut body = male_submission();
    body.as_object_mut().unwrap().remove("sex");

    let (status, response) = post_json(app, "/submit", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "missing_field");
    assert!(response["message"].as_str().unwrap().contains("sex"));
}

#[tokio::test]
async fn test_wrong_type_is_invalid_payload() {
    let (app, _state) = test_app();
    let mut body = male_submission();
    body["height_cm"] = json!("tall");

    let (status, response) = post_json(app, "/submit", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid_payload");
}

#[tokio::test]
async fn test_submission_is_stored_with_report() {
    let app = test_app_with(|state| state);

    let (status, _) = post_json(app.router, "/submit", male_submission()).await;
    assert_eq!(status, StatusCode::OK);

    let stored = app.store.get("Alex Smith").unwrap().unwrap();
    assert_eq!(stored.record.weight_kg, 72.57);
    assert_eq!(
        stored.record.timestamp.to_rfc3339(),
        "2024-03-01T08:15:30+00:00"
    );
    assert!(stored.report.contains("Generated: 2024-03-01 08:15:30 UTC"));
}

#[tokio::test]
async fn test_rejected_submission_has_no_side_effects() {
    let app = test_app_with(|state| state);
    let mut body = male_submission();
    body["height_cm"] = json!(0);

    let (status, _) = post_json(app.router, "/submit", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.count().unwrap(), 0);
    assert!(app.notifier.sent().unwrap().is_empty());
}

#[tokio::test]
async fn test_report_delivered_to_submitter() {
    let app = test_app_with(|state| state);

    post_json(app.router, "/submit", male_submission()).await;

    let sent = app.notifier.sent().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "alex@example.com");
    assert!(sent[0].body.contains("Body Fat Percentage: 22.62%"));
}

#[tokio::test]
async fn test_no_delivery_without_recipient() {
    let app = test_app_with(|state| state);

    let (status, _) = post_json(app.router, "/submit", female_submission()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(app.notifier.sent().unwrap().is_empty());
    assert_eq!(app.store.count().unwrap(), 1);
}

#[tokio::test]
async fn test_email_required_deployment() {
    let store = shared::storage::InMemoryReportStore::new_shared();
    let state = api::AppState::new(
        fixed_engine().with_email_policy(EmailPolicy::Required),
        store,
    );
    let router = api::create_router(state);

    let (status, response) = post_json(router.clone(), "/submit", female_submission()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "missing_field");

    let (status, _) = post_json(router, "/submit", male_submission()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_applies_to_submissions_only() {
    let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
        max_requests: 2,
        window: Duration::from_secs(900),
    }));
    let app = test_app_with(|state| state.with_rate_limiter(limiter));

    for _ in 0..2 {
        let (status, _) = post_json(app.router.clone(), "/submit", male_submission()).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, response) = post_json(app.router.clone(), "/submit", male_submission()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response["error"], "rate_limited");

    let (status, _) = super::common::get(app.router, "/health").await;
    assert_eq!(status, StatusCode::OK);
}
