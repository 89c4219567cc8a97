use anyhow::{Context, Result};
use clap::Parser;
use meetmod::{create_router, AppState, Config};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "meetmod", about = "Real-time meeting co-moderator client")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(short, long, default_value = "config/meetmod")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Arc::new(Config::load(&args.config)?);

    info!("{} starting", cfg.service.name);
    info!(
        "backend: ws={} api={}",
        cfg.backend.ws_endpoint,
        cfg.backend.api_endpoint.as_deref().unwrap_or("(none)")
    );

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let app = create_router(AppState::new(cfg));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("control API listening on {}", addr);

    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}
