//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::{Router, body::Body};
use http::Request;

use rsvp::api::AppState;
use rsvp::api::app;
use rsvp::core::AppConfig;
use rsvp::rsvp::sheet::RetryPolicy;

/// Config pointing at `sheet_api_url` with retries fast enough for tests.
pub fn test_config(sheet_api_url: Option<&str>) -> AppConfig {
    AppConfig {
        sheet_api_url: sheet_api_url.map(str::to_string),
        upstream_timeout: Duration::from_secs(5),
        retry: RetryPolicy {
            max_retries: 1,
            initial_backoff: Duration::from_millis(1),
        },
        static_dir: String::from("./web"),
        ..Default::default()
    }
}

pub fn test_app_with_config(config: AppConfig) -> Router {
    let app_state = AppState::new(config).expect("Failed to build app state");
    app(Arc::new(RwLock::new(app_state)))
}

/// App without a spreadsheet endpoint configured
pub fn test_app() -> Router {
    test_app_with_config(test_config(None))
}

/// App forwarding RSVPs to `sheet_api_url`, usually a mockito server
pub fn test_app_with_sheet(sheet_api_url: &str) -> Router {
    test_app_with_config(test_config(Some(sheet_api_url)))
}

pub fn rsvp_request(client_ip: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .uri("/api/rsvp")
        .method("POST")
        .header("content-type", "application/json")
        .header("x-forwarded-for", client_ip)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf-8")
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    serde_json::from_str(&body_to_string(body).await).expect("Body is not JSON")
}
