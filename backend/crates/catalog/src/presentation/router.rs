//! Catalog Router

use crate::application::read_through::ReadThroughCache;
use crate::domain::source::RemoteSource;
use crate::presentation::handlers;
use axum::{
    Router,
    routing::{get, post},
};
use kernel::clock::Clock;
use platform::store::KeyValueStore;

/// Create the listing router over a shared cache
pub fn catalog_router<S, R, C>(cache: ReadThroughCache<S, R, C>) -> Router
where
    S: KeyValueStore + Send + Sync + 'static,
    R: RemoteSource,
    C: Clock + 'static,
{
    Router::new()
        .route("/", get(handlers::get_listing::<S, R, C>))
        .route("/invalidate", post(handlers::invalidate::<S, R, C>))
        .with_state(cache)
}
