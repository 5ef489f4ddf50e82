//! HTTP Handlers

use crate::application::store::HistoryStore;
use crate::domain::entities::HistoryRecord;
use crate::presentation::dto::{AddRecordRequest, CountResponse};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use kernel::clock::Clock;
use kernel::error::app_error::AppResult;
use kernel::id::HistoryRecordId;
use platform::compaction::ImageCompactor;
use platform::store::KeyValueStore;
use std::sync::Arc;

/// Shared state for history handlers
pub type HistoryState<S, I, C> = Arc<HistoryStore<S, I, C>>;

/// GET /api/history
pub async fn list_records<S, I, C>(
    State(history): State<HistoryState<S, I, C>>,
) -> Json<Vec<HistoryRecord>>
where
    S: KeyValueStore + Send + Sync + 'static,
    I: ImageCompactor + Send + Sync + 'static,
    C: Clock + 'static,
{
    Json(history.list().await)
}

/// POST /api/history
pub async fn add_record<S, I, C>(
    State(history): State<HistoryState<S, I, C>>,
    Json(req): Json<AddRecordRequest>,
) -> AppResult<Json<Vec<HistoryRecord>>>
where
    S: KeyValueStore + Send + Sync + 'static,
    I: ImageCompactor + Send + Sync + 'static,
    C: Clock + 'static,
{
    let input = req.into_new_record()?;
    Ok(Json(history.add(input).await))
}

/// DELETE /api/history/{id}
pub async fn remove_record<S, I, C>(
    State(history): State<HistoryState<S, I, C>>,
    Path(id): Path<String>,
) -> Json<Vec<HistoryRecord>>
where
    S: KeyValueStore + Send + Sync + 'static,
    I: ImageCompactor + Send + Sync + 'static,
    C: Clock + 'static,
{
    Json(history.remove(HistoryRecordId::from(id)).await)
}

/// DELETE /api/history
pub async fn clear_records<S, I, C>(
    State(history): State<HistoryState<S, I, C>>,
) -> AppResult<StatusCode>
where
    S: KeyValueStore + Send + Sync + 'static,
    I: ImageCompactor + Send + Sync + 'static,
    C: Clock + 'static,
{
    history.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/history/count
pub async fn count_records<S, I, C>(
    State(history): State<HistoryState<S, I, C>>,
) -> Json<CountResponse>
where
    S: KeyValueStore + Send + Sync + 'static,
    I: ImageCompactor + Send + Sync + 'static,
    C: Clock + 'static,
{
    Json(CountResponse {
        count: history.count().await,
    })
}
