// Configuration for the streaming server

use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub rate_limit_per_minute: u32,
    pub request_timeout_secs: u64,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub chunk_delay_ms: u64,
    pub max_stream_length: usize,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8085,
            rate_limit_per_minute: 60,
            request_timeout_secs: 60,
            cors_allowed_origins: None,
            chunk_delay_ms: 50,
            max_stream_length: 1_000_000,
            max_body_bytes: 16 * 1024,
        }
    }
}

/// Read `key` from the environment, falling back to `default` when unset or unparsable.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            });

        Self {
            port: env_or("PORT", defaults.port),
            rate_limit_per_minute: env_or("RATE_LIMIT_PER_MINUTE", defaults.rate_limit_per_minute),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            cors_allowed_origins,
            chunk_delay_ms: env_or("CHUNK_DELAY_MS", defaults.chunk_delay_ms),
            max_stream_length: env_or("MAX_STREAM_LENGTH", defaults.max_stream_length),
            max_body_bytes: env_or("MAX_BODY_BYTES", defaults.max_body_bytes),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }
}
