mod common;

use axum::http::StatusCode;
use serde_json::json;
use snaplink::infrastructure::cache::{CacheService, keys};
use snaplink::state::RuntimeOptions;

#[tokio::test]
async fn test_shorten_success() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com/some/long/path" }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let body = response.json::<serde_json::Value>();
    let code = body["short_code"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert_eq!(body["short_url"], format!("{}/{}", common::BASE_URL, code));
    assert_eq!(body["original_url"], "https://example.com/some/long/path");

    assert_eq!(
        app.cache.get(&keys::short_url(code)).await.unwrap(),
        Some("https://example.com/some/long/path".to_string())
    );

    let stored = app.store.link(code).unwrap();
    assert_eq!(stored.creator_ip, "127.0.0.1");
    assert_eq!(stored.clicks, 0);
}

#[tokio::test]
async fn test_shorten_invalid_url() {
    let app = common::spawn_app();

    for url in ["not a url", "ftp://example.com/file"] {
        let response = app
            .server
            .post("/api/shorten")
            .json(&json!({ "url": url }))
            .await;

        response.assert_status_bad_request();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["error"]["code"], "validation_error");
    }
}

#[tokio::test]
async fn test_shorten_missing_url() {
    let app = common::spawn_app();

    let response = app.server.post("/api/shorten").json(&json!({})).await;

    response.assert_status_bad_request();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["message"], "Invalid URL provided");
}

#[tokio::test]
async fn test_shorten_malformed_json() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/api/shorten")
        .bytes(r#"{"url": "https://exa"#.into())
        .content_type("application/json")
        .await;

    response.assert_status_bad_request();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["code"], "validation_error");
    assert!(body["error"]["details"]["reason"].is_string());
}

#[tokio::test]
async fn test_shorten_daily_limit() {
    let app = common::spawn_app_with(RuntimeOptions {
        enforce_rate_limit: true,
        ..common::options()
    });

    for _ in 0..5 {
        app.shorten("https://example.com").await;
    }

    let response = app
        .server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["code"], "rate_limited");
    assert_eq!(
        body["error"]["message"],
        "Daily limit reached (5 URLs/day). Try again tomorrow."
    );
}

#[tokio::test]
async fn test_shorten_limit_bypassed_outside_production() {
    let app = common::spawn_app();

    for _ in 0..7 {
        app.shorten("https://example.com").await;
    }

    assert_eq!(app.cache.get("rate:127.0.0.1").await.unwrap(), None);
}

#[tokio::test]
async fn test_shorten_limit_keyed_by_forwarded_ip_behind_proxy() {
    let app = common::spawn_app_with(RuntimeOptions {
        enforce_rate_limit: true,
        behind_proxy: true,
        ..common::options()
    });

    for ip in ["203.0.113.1", "203.0.113.2"] {
        for _ in 0..5 {
            app.server
                .post("/api/shorten")
                .add_header("X-Forwarded-For", ip)
                .json(&json!({ "url": "https://example.com" }))
                .await
                .assert_status(StatusCode::CREATED);
        }
    }

    app.server
        .post("/api/shorten")
        .add_header("X-Forwarded-For", "203.0.113.1")
        .json(&json!({ "url": "https://example.com" }))
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_shorten_limit_fails_closed_without_cache() {
    let app = common::spawn_app_with(RuntimeOptions {
        enforce_rate_limit: true,
        ..common::options()
    });
    app.cache.set_available(false);

    let response = app
        .server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["code"], "service_unavailable");
}
