//! Fan-out endpoint behaviour over the HTTP router.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use tower::ServiceExt;

use fanout_demo::http::{FANOUT_PATH, X_REQUEST_ID};

mod common;

#[tokio::test(start_paused = true)]
async fn test_concurrent_run_takes_max_latency() {
    let app = common::app(common::test_config(1000));

    let (status, body) = common::send(&app, Method::POST, FANOUT_PATH, None).await;

    assert_eq!(status, StatusCode::OK);
    let total = body["total_time_seconds"].as_f64().unwrap();
    assert!((1.0..=1.3).contains(&total), "total_time_seconds = {total}");
    assert_eq!(body["mode"], "concurrent");

    let results = body["results"].as_object().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results["operation_a"]["operation"], "operation_a");
    assert_eq!(results["operation_b"]["operation"], "operation_b");
}

#[tokio::test(start_paused = true)]
async fn test_get_and_sequential_mode() {
    let app = common::app(common::test_config(1000));

    let (status, body) = common::send(&app, Method::GET, FANOUT_PATH, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["total_time_seconds"].as_f64().unwrap() < 1.7);

    let uri = format!("{FANOUT_PATH}?mode=sequential");
    let (status, body) = common::send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "sequential");
    assert!(body["total_time_seconds"].as_f64().unwrap() >= 2.0);
}

#[tokio::test(start_paused = true)]
async fn test_custom_labels_are_reported() {
    let mut config = common::test_config(300);
    config.demo.operation_a.label = "github_message".into();
    config.demo.operation_b.label = "quote".into();
    config.demo.operation_b.delay_ms = 100;
    let app = common::app(config);

    let (status, body) = common::send(&app, Method::POST, FANOUT_PATH, None).await;

    assert_eq!(status, StatusCode::OK);
    let labels: Vec<&String> = body["results"].as_object().unwrap().keys().collect();
    assert_eq!(labels, ["github_message", "quote"]);
}

#[tokio::test(start_paused = true)]
async fn test_failing_operation_is_attributed() {
    let mut config = common::test_config(1000);
    config.demo.operation_a.fail = true;
    let app = common::app(config);

    let (status, body) = common::send(&app, Method::POST, FANOUT_PATH, None).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "operation_failed");
    assert_eq!(body["operation"], "operation_a");
    assert!(body["message"].as_str().unwrap().contains("operation_a"));
    assert!(body.get("results").is_none());
}

#[tokio::test]
async fn test_unreachable_fetch_url_fails_that_operation() {
    let mut config = common::test_config(10);
    config.demo.operation_b.fetch_url = Some("http://127.0.0.1:1/zen".into());
    let app = common::app(config);

    let (status, body) = common::send(&app, Method::GET, FANOUT_PATH, None).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["operation"], "operation_b");
}

#[tokio::test(start_paused = true)]
async fn test_response_carries_request_id() {
    let app = common::app(common::test_config(10));

    let request = Request::builder()
        .uri(FANOUT_PATH)
        .header(X_REQUEST_ID, "req-123")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()[X_REQUEST_ID], "req-123");

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response.headers().contains_key(X_REQUEST_ID));
}

#[tokio::test]
async fn test_unknown_mode_gets_json_error() {
    let app = common::app(common::test_config(10));

    let uri = format!("{FANOUT_PATH}?mode=parallel");
    let (status, body) = common::send(&app, Method::GET, &uri, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
    assert!(body["message"].as_str().unwrap().contains("parallel"));
    assert!(body.get("operation").is_none());
}
