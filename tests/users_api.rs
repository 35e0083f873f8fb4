//! CRUD behaviour over the HTTP router.

use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;

#[tokio::test]
async fn test_create_list_delete() {
    let app = common::app(common::test_config(10));

    let (status, created) = common::send(
        &app,
        Method::POST,
        "/users",
        Some(json!({ "name": "Alice", "email": "a@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, users) = common::send(&app, Method::GET, "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        users,
        json!([{ "id": id, "name": "Alice", "email": "a@x.com" }])
    );

    let (status, _) = common::send(&app, Method::DELETE, &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, users) = common::send(&app, Method::GET, "/users", None).await;
    assert_eq!(users, json!([]));
}

#[tokio::test]
async fn test_edit_email_keeps_id_and_name() {
    let app = common::app(common::test_config(10));
    let (_, created) = common::send(
        &app,
        Method::POST,
        "/users",
        Some(json!({ "name": "Alice", "email": "a@x.com" })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = common::send(
        &app,
        Method::PUT,
        &format!("/users/{id}"),
        Some(json!({ "email": "alice@y.org" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        updated,
        json!({ "id": id, "name": "Alice", "email": "alice@y.org" })
    );

    let (_, fetched) = common::send(&app, Method::GET, &format!("/users/{id}"), None).await;
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn test_missing_user_is_not_found() {
    let app = common::app(common::test_config(10));

    let (status, body) = common::send(
        &app,
        Method::PUT,
        "/users/999",
        Some(json!({ "email": "x@y.org" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "user 999 not found");

    let (status, _) = common::send(&app, Method::DELETE, "/users/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = common::send(&app, Method::GET, "/users/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_presence_checks() {
    let app = common::app(common::test_config(10));

    let (status, body) = common::send(
        &app,
        Method::POST,
        "/users",
        Some(json!({ "name": "  ", "email": "a@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
    assert_eq!(body["message"], "invalid user: name is required");

    let (_, users) = common::send(&app, Method::GET, "/users", None).await;
    assert_eq!(users, json!([]));
}

#[tokio::test]
async fn test_form_registration_edit_and_delete() {
    let app = common::app(common::test_config(10));

    let (status, created) = common::send_form(&app, "/welcome", "name=Bob&email=b%40x.com").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Bob");
    assert_eq!(created["email"], "b@x.com");
    let id = created["id"].as_i64().unwrap();

    let (status, edited) = common::send_form(&app, &format!("/edit/{id}"), "name=Robert").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["name"], "Robert");
    assert_eq!(edited["email"], "b@x.com");

    let (status, shown) = common::send(&app, Method::GET, &format!("/edit/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shown, edited);

    let (status, _) = common::send_form(&app, &format!("/delete/{id}"), "").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = common::send_form(&app, &format!("/delete/{id}"), "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_service_routes() {
    let app = common::app(common::test_config(10));

    let (status, body) = common::send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (status, body) = common::send(&app, Method::GET, "/favicon.ico", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, body) = common::send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "fanout-demo");
    assert_eq!(body["operations"], json!(["operation_a", "operation_b"]));
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    let mut config = common::test_config(10);
    config.listener.max_body_bytes = 16;
    let app = common::app(config);

    let payload = json!({ "name": "Alice".repeat(10), "email": "a@x.com" }).to_string();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, payload.len())
        .body(Body::from(payload))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_malformed_requests_get_json_errors() {
    let app = common::app(common::test_config(10));

    let (status, body) = common::send(&app, Method::GET, "/users/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
    assert!(body["message"].is_string());

    let (status, body) = common::send_raw(
        &app,
        Method::POST,
        "/users",
        Some("application/json"),
        "{not json",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");

    let (status, body) = common::send_raw(
        &app,
        Method::POST,
        "/users",
        None,
        r#"{"name":"Alice","email":"a@x.com"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"], "invalid_request");

    let (status, body) = common::send_form(&app, "/edit/abc", "name=Bob").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");

    let (status, body) = common::send(&app, Method::DELETE, "/users/1.5", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
}
