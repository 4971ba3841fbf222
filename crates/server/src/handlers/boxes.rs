//! Storage box endpoints.

use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{require_name, rfc3339};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use stampkeeper_metadata::models::StorageBoxRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Storage box as served by the API.
#[derive(Debug, Serialize)]
pub struct BoxResponse {
    pub id: String,
    pub name: String,
    pub date_created: String,
    /// Total quantity across the box's non-deleted instances.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamp_count: Option<i64>,
}

/// Request body for creating or renaming a box.
#[derive(Debug, Deserialize)]
pub struct BoxRequest {
    pub name: String,
}

/// GET /api/boxes - All boxes with instance counts.
pub async fn list_boxes(State(state): State<AppState>) -> ApiResult<Json<Vec<BoxResponse>>> {
    let boxes = state.metadata.list_boxes().await?;
    let responses = boxes
        .iter()
        .map(|summary| {
            Ok(BoxResponse {
                id: summary.id.to_string(),
                name: summary.name.clone(),
                date_created: rfc3339(summary.date_created)?,
                stamp_count: Some(summary.instance_count),
            })
        })
        .collect::<ApiResult<Vec<_>>>()?;
    Ok(Json(responses))
}

/// GET /api/boxes/{id} - Single box.
pub async fn get_box(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BoxResponse>> {
    let storage_box = state
        .metadata
        .get_box(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("box not found".to_string()))?;
    Ok(Json(BoxResponse {
        id: storage_box.id.to_string(),
        name: storage_box.name,
        date_created: rfc3339(storage_box.date_created)?,
        stamp_count: None,
    }))
}

/// POST /api/boxes - Create a box.
pub async fn create_box(
    State(state): State<AppState>,
    Json(request): Json<BoxRequest>,
) -> ApiResult<(StatusCode, Json<BoxResponse>)> {
    require_name(&request.name, "box")?;

    let storage_box = StorageBoxRow {
        id: Uuid::new_v4(),
        name: request.name.trim().to_string(),
        date_created: OffsetDateTime::now_utc(),
    };
    state.metadata.create_box(&storage_box).await?;

    Ok((
        StatusCode::CREATED,
        Json(BoxResponse {
            id: storage_box.id.to_string(),
            name: storage_box.name,
            date_created: rfc3339(storage_box.date_created)?,
            stamp_count: None,
        }),
    ))
}

/// PUT /api/boxes/{id} - Rename a box.
pub async fn update_box(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<BoxRequest>,
) -> ApiResult<Json<BoxResponse>> {
    require_name(&request.name, "box")?;

    let existing = state
        .metadata
        .get_box(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("box not found".to_string()))?;

    let updated = StorageBoxRow {
        id,
        name: request.name.trim().to_string(),
        date_created: existing.date_created,
    };
    state.metadata.update_box(&updated).await?;

    Ok(Json(BoxResponse {
        id: updated.id.to_string(),
        name: updated.name,
        date_created: rfc3339(updated.date_created)?,
        stamp_count: None,
    }))
}

/// DELETE /api/boxes/{id} - Delete the box; its instances lose their shelf
/// location but are kept.
pub async fn delete_box(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.metadata.delete_box(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
