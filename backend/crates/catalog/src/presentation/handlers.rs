//! HTTP Handlers

use crate::application::read_through::{ReadThroughCache, Served};
use crate::domain::source::RemoteSource;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::clock::Clock;
use kernel::error::app_error::AppResult;
use platform::store::KeyValueStore;

/// Response header telling whether the payload came from the cache
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// GET /api/community
pub async fn get_listing<S, R, C>(
    State(cache): State<ReadThroughCache<S, R, C>>,
) -> AppResult<impl IntoResponse>
where
    S: KeyValueStore + Send + Sync + 'static,
    R: RemoteSource,
    C: Clock + 'static,
{
    let outcome = cache.fetch().await?;
    let status = match outcome.served {
        Served::Cache => "hit",
        Served::Remote => "miss",
    };
    Ok(([(CACHE_STATUS_HEADER, status)], Json(outcome.payload)))
}

/// POST /api/community/invalidate
pub async fn invalidate<S, R, C>(
    State(cache): State<ReadThroughCache<S, R, C>>,
) -> AppResult<StatusCode>
where
    S: KeyValueStore + Send + Sync + 'static,
    R: RemoteSource,
    C: Clock + 'static,
{
    cache.invalidate().await?;
    Ok(StatusCode::NO_CONTENT)
}
