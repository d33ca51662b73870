use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use server::{build_router, config::ServerConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    async_main().await
}

async fn async_main() -> anyhow::Result<()> {
    info!("Starting chunked text streaming server...");

    let config = ServerConfig::from_env();
    info!(
        "Server configuration loaded: port={}, rate_limit={}/min, chunk_delay={}ms, max_length={}",
        config.port, config.rate_limit_per_minute, config.chunk_delay_ms, config.max_stream_length
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    let app = build_router(AppState::new(config))?;

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!("Failed to bind {addr}: {e}. Try a different PORT.")
    })?;

    info!("Server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
