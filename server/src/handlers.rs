use std::sync::atomic::Ordering;
use std::time::Instant;

use axum::{
    extract::State,
    http::{HeaderMap, Uri},
    response::Response,
    Json,
};
use chrono::Utc;
use lorem_core::{DEFAULT_CHUNK_SIZE, DEFAULT_LENGTH};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::metrics::{system_metrics, DetailedMetricsResponse, EndpointMetricsResponse};
use crate::streaming::chunked_response;
use crate::validation::validate_stream_request;
use crate::{AppState, REQUEST_ID_HEADER};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRequest {
    #[serde(default = "default_length")]
    pub length: i64,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: i64,
}

fn default_length() -> i64 {
    DEFAULT_LENGTH as i64
}

fn default_chunk_size() -> i64 {
    DEFAULT_CHUNK_SIZE as i64
}

pub async fn health_check() -> &'static str {
    "ok"
}

/// Stream placeholder text back in `chunkSize` pieces with a pause after each.
pub async fn chat_test_endpoint(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<StreamRequest>,
) -> Result<Response, ApiError> {
    let start_time = Instant::now();
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let plan = match validate_stream_request(
        req.length,
        req.chunk_size,
        state.config.max_stream_length,
    ) {
        Ok(plan) => plan,
        Err(e) => {
            state.metrics.chat_test.record_error();
            warn!(request_id = %request_id, "Rejected chat-test request: {e}");
            return Err(e);
        }
    };

    info!(
        request_id = %request_id,
        length = plan.length(),
        chunk_size = plan.chunk_size(),
        chunks = plan.chunk_count(),
        "Starting chunk stream"
    );

    let response = chunked_response(
        plan,
        state.config.chunk_delay(),
        state.metrics.stream.clone(),
        request_id,
    );
    state
        .metrics
        .chat_test
        .record_request(start_time.elapsed().as_millis() as u64);
    Ok(response)
}

pub async fn metrics_endpoint(State(state): State<AppState>) -> Json<DetailedMetricsResponse> {
    let request_count = state.request_count.load(Ordering::Relaxed);
    let uptime = state.started_at.elapsed().as_secs();

    Json(DetailedMetricsResponse {
        timestamp: Utc::now(),
        system: system_metrics(request_count, uptime),
        endpoints: EndpointMetricsResponse {
            chat_test: state.metrics.chat_test.stats(),
        },
        stream: state.metrics.stream.stats(),
    })
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
