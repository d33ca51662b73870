// Metrics collection and tracking

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

const MAX_LATENCY_SAMPLES: usize = 1000;

/// Per-endpoint metrics
#[derive(Debug, Clone)]
pub struct EndpointMetrics {
    pub request_count: Arc<AtomicU64>,
    pub error_count: Arc<AtomicU64>,
    pub total_latency_ms: Arc<AtomicU64>,
    pub min_latency_ms: Arc<AtomicU64>,
    pub max_latency_ms: Arc<AtomicU64>,
    latency_samples: Arc<Mutex<Vec<u64>>>,
}

impl EndpointMetrics {
    pub fn new() -> Self {
        Self {
            request_count: Arc::new(AtomicU64::new(0)),
            error_count: Arc::new(AtomicU64::new(0)),
            total_latency_ms: Arc::new(AtomicU64::new(0)),
            min_latency_ms: Arc::new(AtomicU64::new(u64::MAX)),
            max_latency_ms: Arc::new(AtomicU64::new(0)),
            latency_samples: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn record_request(&self, latency_ms: u64) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
        self.min_latency_ms.fetch_min(latency_ms, Ordering::Relaxed);
        self.max_latency_ms.fetch_max(latency_ms, Ordering::Relaxed);

        if let Ok(mut samples) = self.latency_samples.lock() {
            samples.push(latency_ms);
            if samples.len() > MAX_LATENCY_SAMPLES {
                samples.remove(0);
            }
        }
    }

    pub fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn avg_latency_ms(&self) -> f64 {
        let count = self.request_count.load(Ordering::Relaxed);
        if count == 0 {
            return 0.0;
        }
        let total = self.total_latency_ms.load(Ordering::Relaxed);
        total as f64 / count as f64
    }

    fn percentile(&self, p: u8) -> u64 {
        if let Ok(samples) = self.latency_samples.lock() {
            if samples.is_empty() {
                return 0;
            }
            let mut sorted = samples.clone();
            sorted.sort_unstable();
            let index = (sorted.len() * p as usize / 100).min(sorted.len() - 1);
            sorted[index]
        } else {
            0
        }
    }

    pub fn stats(&self) -> EndpointStats {
        let min = self.min_latency_ms.load(Ordering::Relaxed);
        EndpointStats {
            request_count: self.request_count.load(Ordering::Relaxed),
            error_count: self.error_count.load(Ordering::Relaxed),
            avg_latency_ms: self.avg_latency_ms(),
            min_latency_ms: if min == u64::MAX { 0 } else { min },
            max_latency_ms: self.max_latency_ms.load(Ordering::Relaxed),
            p50_latency_ms: self.percentile(50),
            p95_latency_ms: self.percentile(95),
            p99_latency_ms: self.percentile(99),
        }
    }
}

impl Default for EndpointMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters for emitted chunk streams
#[derive(Debug, Clone, Default)]
pub struct StreamMetrics {
    pub streams_started: Arc<AtomicU64>,
    pub streams_completed: Arc<AtomicU64>,
    pub chunks_sent: Arc<AtomicU64>,
    pub bytes_sent: Arc<AtomicU64>,
    pub total_stream_time_ms: Arc<AtomicU64>,
}

impl StreamMetrics {
    pub fn record_started(&self) {
        self.streams_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_chunk(&self, bytes: usize) {
        self.chunks_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_completed(&self, started: Instant) {
        self.streams_completed.fetch_add(1, Ordering::Relaxed);
        self.total_stream_time_ms
            .fetch_add(started.elapsed().as_millis() as u64, Ordering::Relaxed);
    }

    /// Streams started but not (yet) completed, including aborted ones.
    pub fn unfinished(&self) -> u64 {
        let started = self.streams_started.load(Ordering::Relaxed);
        started.saturating_sub(self.streams_completed.load(Ordering::Relaxed))
    }

    pub fn avg_stream_time_ms(&self) -> f64 {
        let count = self.streams_completed.load(Ordering::Relaxed);
        if count == 0 {
            return 0.0;
        }
        self.total_stream_time_ms.load(Ordering::Relaxed) as f64 / count as f64
    }

    pub fn stats(&self) -> StreamStats {
        StreamStats {
            streams_started: self.streams_started.load(Ordering::Relaxed),
            streams_completed: self.streams_completed.load(Ordering::Relaxed),
            streams_unfinished: self.unfinished(),
            chunks_sent: self.chunks_sent.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            avg_stream_time_ms: self.avg_stream_time_ms(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppMetrics {
    pub chat_test: EndpointMetrics,
    pub stream: StreamMetrics,
}

impl AppMetrics {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Serialize)]
pub struct DetailedMetricsResponse {
    pub timestamp: DateTime<Utc>,
    pub system: SystemMetrics,
    pub endpoints: EndpointMetricsResponse,
    pub stream: StreamStats,
}

#[derive(Serialize)]
pub struct SystemMetrics {
    pub cpu_usage_percent: f32,
    pub memory_used_mb: u64,
    pub memory_total_mb: u64,
    pub memory_usage_percent: f32,
    pub request_count: u64,
    pub uptime_seconds: u64,
    pub system_load: Option<f64>,
}

#[derive(Serialize)]
pub struct EndpointMetricsResponse {
    pub chat_test: EndpointStats,
}

#[derive(Debug, Serialize)]
pub struct EndpointStats {
    pub request_count: u64,
    pub error_count: u64,
    pub avg_latency_ms: f64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    pub p50_latency_ms: u64,
    pub p95_latency_ms: u64,
    pub p99_latency_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct StreamStats {
    pub streams_started: u64,
    pub streams_completed: u64,
    pub streams_unfinished: u64,
    pub chunks_sent: u64,
    pub bytes_sent: u64,
    pub avg_stream_time_ms: f64,
}

/// Snapshot CPU, memory and load for the metrics endpoint.
pub fn system_metrics(request_count: u64, uptime_seconds: u64) -> SystemMetrics {
    let mut system = sysinfo::System::new();
    system.refresh_cpu();
    system.refresh_memory();

    let cpu_usage = system.global_cpu_info().cpu_usage();

    let memory_used = system.used_memory();
    let memory_total = system.total_memory();
    let memory_usage_percent = if memory_total > 0 {
        (memory_used as f64 / memory_total as f64 * 100.0) as f32
    } else {
        0.0
    };

    // Unix-like systems only
    let system_load = {
        #[cfg(unix)]
        {
            std::fs::read_to_string("/proc/loadavg")
                .ok()
                .and_then(|loadavg| {
                    loadavg
                        .split_whitespace()
                        .next()
                        .and_then(|s| s.parse::<f64>().ok())
                })
        }
        #[cfg(not(unix))]
        None
    };

    SystemMetrics {
        cpu_usage_percent: cpu_usage,
        memory_used_mb: memory_used / 1024 / 1024,
        memory_total_mb: memory_total / 1024 / 1024,
        memory_usage_percent,
        request_count,
        uptime_seconds,
        system_load,
    }
}
