//! Collection statistics and health endpoints.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

/// Aggregate collection counts.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Sum of all non-deleted instance quantities.
    pub total_owned: i64,
    /// Distinct scott numbers among non-deleted designs.
    pub unique_stamps: i64,
    /// Designs with no non-deleted instance.
    pub stamps_needed: i64,
    pub storage_boxes: i64,
}

/// GET /api/stats - Collection statistics.
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let stats = state.metadata.collection_stats().await?;
    Ok(Json(StatsResponse {
        total_owned: stats.total_owned,
        unique_stamps: stats.unique_stamps,
        stamps_needed: stats.stamps_needed,
        storage_boxes: stats.storage_boxes,
    }))
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /api/health - Health check.
///
/// Intentionally open so load balancers and probes can reach it. Returns
/// only non-sensitive information.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    state.metadata.health_check().await?;
    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}
