//! Streamed response assembly for the chat-test endpoint.

use std::convert::Infallible;
use std::pin::pin;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::StreamExt;
use lorem_core::ChunkPlan;
use tracing::{debug, info};

use crate::metrics::StreamMetrics;

/// Static headers sent with every chunk stream.
pub fn stream_headers() -> [(HeaderName, HeaderValue); 5] {
    [
        (header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream")),
        (header::TRANSFER_ENCODING, HeaderValue::from_static("chunked")),
        (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
        (
            HeaderName::from_static("netlify-cdn-cache-control"),
            HeaderValue::from_static("public, max-age=0, must-revalidate"),
        ),
        (header::CONNECTION, HeaderValue::from_static("keep-alive")),
    ]
}

/// Build the 200 response whose body emits `plan` chunk by chunk.
pub fn chunked_response(
    plan: ChunkPlan,
    delay: Duration,
    metrics: StreamMetrics,
    request_id: String,
) -> Response {
    metrics.record_started();

    let body = async_stream::stream! {
        let started = Instant::now();
        let mut chunks = pin!(plan.stream(delay));
        let mut index = 0usize;
        while let Some(bytes) = chunks.next().await {
            index += 1;
            metrics.record_chunk(bytes.len());
            debug!(request_id = %request_id, chunk = index, bytes = bytes.len(), "Emitting chunk");
            yield Ok::<_, Infallible>(bytes);
        }
        metrics.record_completed(started);
        info!(
            request_id = %request_id,
            chunks = index,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Chunk stream complete"
        );
    };

    (StatusCode::OK, stream_headers(), Body::from_stream(body)).into_response()
}
