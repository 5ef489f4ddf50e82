//! History Router

use crate::application::store::HistoryStore;
use crate::presentation::handlers;
use axum::{
    Router,
    routing::{delete, get},
};
use kernel::clock::Clock;
use platform::compaction::ImageCompactor;
use platform::store::KeyValueStore;
use std::sync::Arc;

/// Create the history router over a shared store
pub fn history_router<S, I, C>(history: Arc<HistoryStore<S, I, C>>) -> Router
where
    S: KeyValueStore + Send + Sync + 'static,
    I: ImageCompactor + Send + Sync + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route(
            "/",
            get(handlers::list_records::<S, I, C>)
                .post(handlers::add_record::<S, I, C>)
                .delete(handlers::clear_records::<S, I, C>),
        )
        .route("/count", get(handlers::count_records::<S, I, C>))
        .route("/{id}", delete(handlers::remove_record::<S, I, C>))
        .with_state(history)
}
