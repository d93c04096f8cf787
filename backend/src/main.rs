use andy::AndyConfig;
use anyhow::Context;
use backend::api;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AndyConfig::load(std::env::var("ANDY_CONFIG").ok().as_deref().map(std::path::Path::new));
    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", config.bind_addr))?;

    let app = api::router(config.build_fulfiller());
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("[BACKEND] API listening on {}", addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
