//! Integration tests for a configuration-built server writing reports to disk.

use api::{create_router, AppState, Config};
use axum::http::StatusCode;
use shared::models::MetricsRecord;
use shared::storage::StorageFormat;

use super::common::{male_submission, post_json};

fn config_for(dir: &std::path::Path, format: StorageFormat) -> Config {
    Config {
        data_dir: dir.join("data"),
        storage_format: format,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_json_report_written_to_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), StorageFormat::Json);
    let router = create_router(AppState::from_config(&config).unwrap());

    let (status, _) = post_json(router, "/submit", male_submission()).await;
    assert_eq!(status, StatusCode::OK);

    let path = config.data_dir.join("Alex_Smith_data.txt");
    let record: MetricsRecord =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(record.name, "Alex Smith");
    assert_eq!(record.metrics.bmi, 22.4);
    assert_eq!(record.email.as_deref(), Some("alex@example.com"));
}

#[tokio::test]
async fn test_text_report_written_to_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), StorageFormat::Text);
    let router = create_router(AppState::from_config(&config).unwrap());

    post_json(router, "/submit", male_submission()).await;

    let text = std::fs::read_to_string(config.data_dir.join("Alex_Smith_data.txt")).unwrap();
    assert!(text.contains("BODY MEASUREMENT REPORT"));
    assert!(text.contains("BMI:                 22.40"));
}

#[tokio::test]
async fn test_long_name_is_stored() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), StorageFormat::Json);
    let router = create_router(AppState::from_config(&config).unwrap());
    let mut body = male_submission();
    body["name"] = serde_json::json!("x".repeat(300));

    let (status, response) = post_json(router, "/submit", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["success"], true);
    assert_eq!(std::fs::read_dir(&config.data_dir).unwrap().count(), 1);
}

#[tokio::test]
async fn test_storage_failure_is_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("data");
    std::fs::write(&blocker, "not a directory").unwrap();

    let config = config_for(dir.path(), StorageFormat::Json);
    let router = create_router(AppState::from_config(&config).unwrap());

    let (status, response) = post_json(router, "/submit", male_submission()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["success"], false);
    assert_eq!(response["error"], "storage_error");
}
