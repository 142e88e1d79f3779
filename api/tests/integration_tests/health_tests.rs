//! Integration tests for health check and static file serving.

use api::{create_router, with_static_files, AppState};
use axum::http::StatusCode;

use super::common::{get, get_text, test_app, test_app_with};

#[tokio::test]
async fn test_health_check() {
    let (app, _state) = test_app();

    let (status, response) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "healthy");
    assert_eq!(response["service"], "fitreport-api");
    assert_eq!(response["features"]["notifications"], false);
}

#[tokio::test]
async fn test_health_reports_notifications_enabled() {
    let app = test_app_with(|state| state);

    let (_, response) = get(app.router, "/health").await;
    assert_eq!(response["features"]["notifications"], true);
    assert_eq!(response["features"]["rate_limiting"], false);
}

#[tokio::test]
async fn test_unknown_route_without_static_dir_is_not_found() {
    let (app, _state) = test_app();

    let (status, _) = get_text(app, "/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_files_are_served() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>Measurements</h1>").unwrap();

    let app = with_static_files(
        create_router(AppState::with_in_memory_store()),
        dir.path(),
    );

    let (status, body) = get_text(app.clone(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Measurements"));

    // API routes still take precedence over the fallback.
    let (status, _) = get_text(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
}
