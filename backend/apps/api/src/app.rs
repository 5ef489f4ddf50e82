//! Router Assembly

use crate::rate_limit::rate_limit_router;
use axum::Router;
use catalog::{ReadThroughCache, RemoteSource, catalog_router};
use history::{HistoryStore, history_router};
use kernel::clock::Clock;
use platform::compaction::ImageCompactor;
use platform::rate_limit::RateLimiter;
use platform::store::KeyValueStore;
use std::sync::Arc;

/// The three long-lived components, built once at startup
pub struct Components<S, R, I, C>
where
    S: KeyValueStore + Send + Sync + 'static,
    R: RemoteSource,
    I: ImageCompactor + Send + Sync + 'static,
    C: Clock + 'static,
{
    pub limiter: Arc<RateLimiter<C>>,
    pub cache: ReadThroughCache<S, R, C>,
    pub history: Arc<HistoryStore<S, I, C>>,
}

/// Mount every component under `/api`
pub fn api_router<S, R, I, C>(components: Components<S, R, I, C>) -> Router
where
    S: KeyValueStore + Send + Sync + 'static,
    R: RemoteSource,
    I: ImageCompactor + Send + Sync + 'static,
    C: Clock + 'static,
{
    Router::new()
        .nest("/api/rate-limit", rate_limit_router(components.limiter))
        .nest("/api/community", catalog_router(components.cache))
        .nest("/api/history", history_router(components.history))
}
