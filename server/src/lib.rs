//! HTTP server for the chunked placeholder-text stream.
//!
//! `POST /chat-test` (also under `/api`) answers with an event-stream body
//! that delivers generated Lorem-ipsum text in fixed-size chunks, pausing
//! between chunks. The remaining routes are liveness and metrics.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod streaming;
pub mod validation;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::handlers::{chat_test_endpoint, health_check, metrics_endpoint, not_found};
use crate::metrics::AppMetrics;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub metrics: AppMetrics,
    pub request_count: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            metrics: AppMetrics::new(),
            request_count: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }
}

/// Tag request and response with a fresh request id.
async fn add_request_id(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let request_id = uuid::Uuid::new_v4().to_string();
    let header_value = HeaderValue::from_str(&request_id).ok();
    if let Some(ref value) = header_value {
        request.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
    }
    let mut response = next.run(request).await;
    if let Some(value) = header_value {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(false);

    let Some(ref allowed_origins) = config.cors_allowed_origins else {
        warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (development mode)");
        return base.allow_origin(Any);
    };

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        warn!("CORS_ALLOWED_ORIGINS is empty, falling back to permissive CORS");
        base.allow_origin(Any)
    } else {
        info!("CORS configured for {} origin(s)", origins.len());
        base.allow_origin(AllowOrigin::list(origins))
    }
}

/// Assemble the application router with its middleware stack.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let config = &state.config;

    // One global bucket: `rate_limit_per_minute` burst, refilled evenly over a minute.
    let rate_limit = config.rate_limit_per_minute.max(1);
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond((60_000 / rate_limit as u64).max(1))
            .burst_size(rate_limit)
            .key_extractor(GlobalKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("invalid rate limit configuration: {rate_limit}/min"))?,
    );
    info!("Rate limiting: {} requests per minute", rate_limit);

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer::new(governor_conf))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(cors_layer(config))
        .into_inner();

    let api = Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .route("/chat-test", post(chat_test_endpoint))
        .route("/metrics", get(metrics_endpoint));

    let app = Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(axum::middleware::from_fn_with_state(state.clone(), add_request_id))
        .layer(middleware_stack)
        .with_state(state);

    Ok(app)
}
