mod config;
mod error;
mod metrics;
mod server;
mod telemetry;
mod weather;

use anyhow::{Context, Result};
use clap::Parser;
use config::Config;
use metrics::WeatherCollector;
use std::sync::Arc;
use weather::{CachedHttpClient, HttpGet, ProviderRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    telemetry::init(&config)?;

    tracing::info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        "starting weather exporter"
    );

    let http: Arc<dyn HttpGet> = Arc::new(
        CachedHttpClient::new(config.request_timeout, config.cache_ttl)
            .context("Failed to create HTTP client")?,
    );

    let providers = ProviderRegistry::from_config(&config).build_all(http);
    if providers.is_empty() {
        tracing::warn!("no weather providers configured, scrapes will be empty");
    }

    let collector = WeatherCollector::new(providers, usize::from(config.fetch_concurrency));
    tracing::info!(
        providers = collector.provider_count(),
        metrics = collector.describe()?.len(),
        "weather collector ready"
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, endpoint = server::METRICS_PATH, "started serving");

    axum::serve(listener, server::router(Arc::new(collector)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
