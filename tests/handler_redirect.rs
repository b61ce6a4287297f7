mod common;

use axum::http::StatusCode;
use snaplink::domain::click_event::ClickPayload;
use snaplink::domain::entities::DeviceClass;
use snaplink::infrastructure::cache::{CacheService, keys};
use snaplink::state::RuntimeOptions;

#[tokio::test]
async fn test_redirect_success() {
    let app = common::spawn_app();
    let code = app.shorten("https://example.com/target").await;

    let response = app.server.get(&format!("/{code}")).await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "https://example.com/target");
    assert_eq!(
        response.header("cache-control"),
        "public, max-age=86400, s-maxage=86400, stale-while-revalidate=59"
    );
}

#[tokio::test]
async fn test_redirect_head_request() {
    let app = common::spawn_app();
    app.cache
        .set("short:abc123", "https://example.com/")
        .await
        .unwrap();

    let response = app.server.method(axum::http::Method::HEAD, "/abc123").await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "https://example.com/");
}

#[tokio::test]
async fn test_redirect_not_found() {
    let app = common::spawn_app();

    let response = app.server.get("/notfound").await;

    response.assert_status_not_found();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_reserved_path_is_not_redirected() {
    let app = common::spawn_app();
    app.cache
        .set("short:health", "https://example.com/")
        .await
        .unwrap();

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_non_get_is_not_redirected() {
    let app = common::spawn_app();
    app.cache
        .set("short:abc123", "https://example.com/")
        .await
        .unwrap();

    let response = app.server.post("/abc123").await;

    response.assert_status_not_found();
    assert_eq!(app.spawner.pending(), 0);
}

#[tokio::test]
async fn test_cache_outage_falls_through() {
    let app = common::spawn_app();
    app.cache
        .set("short:abc123", "https://example.com/")
        .await
        .unwrap();
    app.cache.set_available(false);

    let response = app.server.get("/abc123").await;

    response.assert_status_not_found();
    assert_eq!(app.spawner.pending(), 0);
}

#[tokio::test]
async fn test_redirect_counts_click_in_background() {
    let app = common::spawn_app();
    let code = app.shorten("https://example.com").await;

    app.server
        .get(&format!("/{code}"))
        .await
        .assert_status(StatusCode::FOUND);

    assert_eq!(app.cache.get(&keys::clicks(&code)).await.unwrap(), None);
    assert_eq!(app.spawner.run_pending().await, 1);
    assert_eq!(
        app.cache.get(&keys::clicks(&code)).await.unwrap(),
        Some("1".to_string())
    );
}

#[tokio::test]
async fn test_sampled_click_carries_request_details() {
    let app = common::spawn_app_with(RuntimeOptions {
        sample_rate: 1.0,
        ..common::options()
    });
    let code = app.shorten("https://example.com").await;

    app.server
        .get(&format!("/{code}"))
        .add_header("User-Agent", "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1")
        .add_header("Referer", "https://news.example/")
        .add_header("cf-ipcountry", "DE")
        .await
        .assert_status(StatusCode::FOUND);
    app.spawner.run_pending().await;

    let queued = app.cache.lrange(keys::ANALYTICS_QUEUE, 0, -1).await.unwrap();
    assert_eq!(queued.len(), 1);

    let payload = ClickPayload::parse(&queued[0]).unwrap();
    assert_eq!(payload.short_code, code);
    assert_eq!(payload.ip, "127.0.0.1");
    assert_eq!(payload.referrer, "https://news.example/");
    assert_eq!(payload.country, "DE");
    assert_eq!(payload.city, "Unknown");
    assert_eq!(payload.device, DeviceClass::Mobile);
}

#[tokio::test]
async fn test_unsampled_clicks_are_only_counted() {
    let app = common::spawn_app_with(RuntimeOptions {
        sample_rate: 0.0,
        ..common::options()
    });
    let code = app.shorten("https://example.com").await;

    for _ in 0..5 {
        app.server
            .get(&format!("/{code}"))
            .await
            .assert_status(StatusCode::FOUND);
    }
    app.spawner.run_pending().await;

    assert_eq!(
        app.cache.get(&keys::clicks(&code)).await.unwrap(),
        Some("5".to_string())
    );
    assert_eq!(app.cache.llen(keys::ANALYTICS_QUEUE).await.unwrap(), 0);
}
