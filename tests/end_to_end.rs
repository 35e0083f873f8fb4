//! Full-stack tests over a real socket.

use std::time::Duration;

use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn test_fanout_over_http() {
    let (addr, shutdown) = common::spawn_server(common::test_config(1000)).await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = client
        .post(format!("http://{addr}/async-example"))
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    let total = body["total_time_seconds"].as_f64().unwrap();
    assert!(total >= 1.0, "total_time_seconds = {total}");
    assert!(total < 1.7, "operations did not overlap: {total}");
    assert_eq!(body["results"].as_object().unwrap().len(), 2);

    shutdown.trigger();
}

#[tokio::test]
async fn test_crud_over_http() {
    let (addr, shutdown) = common::spawn_server(common::test_config(10)).await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let base = format!("http://{addr}");

    let created: Value = client
        .post(format!("{base}/users"))
        .json(&json!({ "name": "Alice", "email": "a@x.com" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["id"].as_i64().unwrap();

    let users: Value = client
        .get(format!("{base}/users"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(users, json!([{ "id": id, "name": "Alice", "email": "a@x.com" }]));

    let res = client
        .delete(format!("{base}/users/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);

    shutdown.trigger();
}

#[tokio::test]
async fn test_graceful_shutdown_stops_listener() {
    let (addr, shutdown) = common::spawn_server(common::test_config(10)).await;
    let client = reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap();

    let res = client.get(format!("http://{addr}/health")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .is_err());
}
