//! Shared helpers for router and server tests.
#![allow(dead_code)]

use autoheal_demo::config::AppConfig;
use autoheal_demo::templates::init_templates;
use autoheal_demo::{create_router, AppState};
use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Router plus a handle on its state, built from `config`.
pub fn app_with_config(config: AppConfig) -> (AppState, Router) {
    let state = AppState::new(config, init_templates().unwrap());
    let router = create_router(state.clone());
    (state, router)
}

pub fn app() -> (AppState, Router) {
    app_with_config(AppConfig::default())
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "body is not JSON ({e}): {}",
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }
}

pub async fn send(app: &Router, method: Method, uri: &str) -> TestResponse {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Method::GET, uri).await
}

pub async fn post(app: &Router, uri: &str) -> TestResponse {
    send(app, Method::POST, uri).await
}

/// Assert the value is an RFC 3339 UTC timestamp string.
pub fn assert_timestamp(value: &serde_json::Value) {
    let ts = value.as_str().expect("timestamp should be a string");
    assert!(ts.ends_with('Z'), "timestamp not UTC: {ts}");
    chrono::DateTime::parse_from_rfc3339(ts).expect("timestamp should parse as RFC 3339");
}
