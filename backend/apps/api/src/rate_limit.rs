//! Rate Limit Routes
//!
//! Exposes the shared limiter so the frontend can gate user actions.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use kernel::clock::Clock;
use kernel::error::app_error::{AppError, AppResult};
use platform::rate_limit::{Operation, RateLimiter, format_wait_time};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request for POST /api/rate-limit/check
#[derive(Debug, Clone, Deserialize)]
pub struct CheckRequest {
    pub operation: String,
    /// Discriminator; empty means one counter for the whole operation
    #[serde(default)]
    pub key: String,
}

/// Response for POST /api/rate-limit/check
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub allowed: bool,
    pub wait_ms: i64,
    pub wait_display: String,
}

/// Query for GET /api/rate-limit/remaining
#[derive(Debug, Clone, Deserialize)]
pub struct RemainingQuery {
    pub operation: String,
    #[serde(default)]
    pub key: String,
}

/// Response for GET /api/rate-limit/remaining
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainingResponse {
    pub remaining_ms: i64,
    pub wait_display: String,
}

pub fn rate_limit_router<C>(limiter: Arc<RateLimiter<C>>) -> Router
where
    C: Clock + 'static,
{
    Router::new()
        .route("/check", post(check::<C>))
        .route("/remaining", get(remaining::<C>))
        .with_state(limiter)
}

fn parse_operation(operation: &str) -> AppResult<Operation> {
    operation
        .parse::<Operation>()
        .map_err(|e| AppError::invalid_input("Unknown operation").with_source(e))
}

/// POST /api/rate-limit/check
async fn check<C>(
    State(limiter): State<Arc<RateLimiter<C>>>,
    Json(req): Json<CheckRequest>,
) -> AppResult<Json<CheckResponse>>
where
    C: Clock + 'static,
{
    let operation = parse_operation(&req.operation)?;
    let decision = limiter.check_and_record(operation, &req.key);

    Ok(Json(CheckResponse {
        allowed: decision.allowed,
        wait_ms: decision.wait_ms,
        wait_display: format_wait_time(decision.wait_ms),
    }))
}

/// GET /api/rate-limit/remaining
async fn remaining<C>(
    State(limiter): State<Arc<RateLimiter<C>>>,
    Query(query): Query<RemainingQuery>,
) -> AppResult<Json<RemainingResponse>>
where
    C: Clock + 'static,
{
    let operation = parse_operation(&query.operation)?;
    let remaining_ms = limiter.peek_remaining(operation, &query.key);

    Ok(Json(RemainingResponse {
        remaining_ms,
        wait_display: format_wait_time(remaining_ms),
    }))
}
