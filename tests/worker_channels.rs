//! 页面与网关之间的控制通道
//!
//! 连通性探测应答、推送通知解析、通知点击的聚焦/新开语义。

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use tokio::sync::broadcast;
use tower::ServiceExt;
use voyage_gateway::AppState;
use voyage_gateway::cache::CacheStore;
use voyage_gateway::config::Config;
use voyage_gateway::messaging::ClientRegistry;
use voyage_gateway::swr::Engine;

fn state_for(upstream: &str) -> AppState {
    let config = Arc::new(Config {
        upstream_url: upstream.to_string(),
        redis_url: "redis://localhost".into(),
        server_host: "127.0.0.1".into(),
        server_port: 0,
        worker_base: "/_worker".into(),
        cache_version: "v1".into(),
        shell_ttl_secs: 86400,
        dynamic_ttl_secs: 3600,
        api_ttl_secs: 300,
        upstream_timeout_secs: 5,
        external_api_hosts: vec![],
    });
    let (events, _) = broadcast::channel(16);
    let engine = Arc::new(
        Engine::new(config.clone(), CacheStore::memory(), events.clone()).unwrap(),
    );
    AppState {
        config,
        engine,
        registry: Arc::new(ClientRegistry::new()),
        events,
    }
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn connectivity_check_replies_to_caller_only() {
    let mut server = mockito::Server::new_async().await;
    let _root = server
        .mock("GET", "/")
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let state = state_for(&server.url());
    let app = voyage_gateway::app(state);

    let response = app
        .oneshot(
            Request::post("/_worker/message")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"type":"CHECK_CONNECTIVITY"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["type"], "CONNECTIVITY_CHANGE");
    assert_eq!(body["status"], "online");
}

#[tokio::test]
async fn push_with_json_payload_displays_titled_notification() {
    let state = state_for("http://127.0.0.1:9");
    let app = voyage_gateway::app(state);

    let response = app
        .oneshot(
            Request::post("/_worker/push")
                .body(Body::from(r#"{"title":"T","body":"B","url":"/x"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["title"], "T");
    assert_eq!(body["body"], "B");
    assert_eq!(body["url"], "/x");
}

#[tokio::test]
async fn push_with_plain_text_falls_back_to_default_title() {
    let state = state_for("http://127.0.0.1:9");
    let app = voyage_gateway::app(state);

    let response = app
        .oneshot(
            Request::post("/_worker/push")
                .body(Body::from("hello"))
                .unwrap(),
        )
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["body"], "hello");
    assert_eq!(
        body["title"],
        voyage_gateway::messaging::model::DEFAULT_PUSH_TITLE
    );
}

#[tokio::test]
async fn notification_click_focuses_registered_page() {
    let state = state_for("http://127.0.0.1:9");
    state.registry.register("/destinations");
    let app = voyage_gateway::app(state.clone());

    let response = app
        .clone()
        .oneshot(
            Request::post("/_worker/notification-click")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"url":"/destinations"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["action"], "focused");

    // 没有匹配页面时新开一个并登记
    let response = app
        .oneshot(
            Request::post("/_worker/notification-click")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"url":"/blog"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["action"], "opened");
    assert_eq!(state.registry.len(), 2);
}
