use api_service::{build_router, cors_layer, AppState, Scoreboard};
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use shared::StoragePolicy;
use std::time::Duration;
use tower::ServiceExt;

pub fn create_test_app() -> Router {
    let policy = StoragePolicy::new(Duration::from_secs(1), 3);
    let state = AppState::new(Scoreboard::in_memory(policy), 10);
    build_router(state, cors_layer("*").unwrap())
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}
