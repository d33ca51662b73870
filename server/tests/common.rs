//! Common utilities for integration tests

use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use server::{build_router, config::ServerConfig, AppState};

/// Configuration without inter-chunk delay so bodies collect instantly.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        chunk_delay_ms: 0,
        max_stream_length: 100_000,
        ..ServerConfig::default()
    }
}

/// Create a test app instance backed by the real router.
pub fn create_test_app() -> Router {
    create_test_app_with(test_config())
}

pub fn create_test_app_with(config: ServerConfig) -> Router {
    build_router(AppState::new(config)).expect("Failed to build router for tests")
}

/// POST a raw JSON body to `uri`.
pub fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// The header table every chunk stream must carry.
pub const EXPECTED_STREAM_HEADERS: [(&str, &str); 5] = [
    ("content-type", "text/event-stream"),
    ("transfer-encoding", "chunked"),
    ("cache-control", "no-cache"),
    ("netlify-cdn-cache-control", "public, max-age=0, must-revalidate"),
    ("connection", "keep-alive"),
];
