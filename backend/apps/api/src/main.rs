//! API Server Entry Point
//!
//! Builds the rate limiter, listing cache and history store once and
//! serves them over a local HTTP surface. Uses `anyhow` for startup
//! errors; handlers use `kernel::error::AppError`.

mod app;
mod config;
mod rate_limit;

use crate::app::{Components, api_router};
use crate::config::ApiConfig;
use axum::http::{self, Method, header};
use catalog::{HttpListingSource, ReadThroughCache};
use history::{HistoryConfig, HistoryStore};
use platform::compaction::JpegCompactor;
use platform::rate_limit::{RateLimitConfig, RateLimiter};
use platform::store::FileStore;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,catalog=info,history=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;

    // Local storage shared by the cache and the history log
    let mut store = FileStore::open(&config.data_dir).await?;
    if let Some(quota) = config.store_quota_bytes {
        store = store.with_quota(quota);
    }
    let store = Arc::new(store);
    tracing::info!(
        data_dir = %config.data_dir.display(),
        quota_bytes = ?config.store_quota_bytes,
        "Store opened"
    );

    let limiter = Arc::new(RateLimiter::new(RateLimitConfig::default()));

    let source = HttpListingSource::new(config.listing_url.clone())?;
    let cache = ReadThroughCache::new(store.clone(), source, config.cache_config());
    tracing::info!(
        url = %config.listing_url,
        freshness_secs = config.freshness_window.as_secs(),
        refresh_policy = %config.refresh_policy,
        "Listing cache ready"
    );

    let history = Arc::new(HistoryStore::new(
        store,
        JpegCompactor,
        HistoryConfig::default(),
    ));
    tracing::info!(records = history.count().await, "History loaded");

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]));

    // Build router
    let app = api_router(Components {
        limiter,
        cache,
        history,
    })
    .layer(TraceLayer::new_for_http())
    .layer(cors);

    // Start server
    tracing::info!("Listening on {}", config.listen_addr);

    let listener = TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
