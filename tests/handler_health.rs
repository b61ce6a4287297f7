mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn test_health_endpoint_success() {
    let app = common::spawn_app();

    let response = app.server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
    assert!(json.get("version").is_some());
}

#[tokio::test]
async fn test_health_reports_cache_outage() {
    let app = common::spawn_app();
    app.cache.set_available(false);

    let response = app.server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "error");
}

#[tokio::test]
async fn test_health_with_trailing_path_is_not_found() {
    let app = common::spawn_app();

    app.server.get("/health/extra").await.assert_status_not_found();
}
