//! Tag endpoints.

use crate::error::ApiResult;
use crate::handlers::common::require_name;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use stampkeeper_metadata::models::TagRow;
use uuid::Uuid;

/// Tag as served by the API.
#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: String,
    pub name: String,
    /// Number of designs carrying this tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamp_count: Option<i64>,
}

/// Request body for creating or renaming a tag.
#[derive(Debug, Deserialize)]
pub struct TagRequest {
    pub name: String,
}

/// GET /api/tags - All tags with design counts.
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<TagResponse>>> {
    let tags = state.metadata.list_tags().await?;
    let responses = tags
        .into_iter()
        .map(|summary| TagResponse {
            id: summary.id.to_string(),
            name: summary.name,
            stamp_count: Some(summary.stamp_count),
        })
        .collect();
    Ok(Json(responses))
}

/// POST /api/tags - Create a tag.
pub async fn create_tag(
    State(state): State<AppState>,
    Json(request): Json<TagRequest>,
) -> ApiResult<(StatusCode, Json<TagResponse>)> {
    require_name(&request.name, "tag")?;

    let tag = TagRow {
        id: Uuid::new_v4(),
        name: request.name.trim().to_string(),
    };
    state.metadata.create_tag(&tag).await?;

    Ok((
        StatusCode::CREATED,
        Json(TagResponse {
            id: tag.id.to_string(),
            name: tag.name,
            stamp_count: None,
        }),
    ))
}

/// PUT /api/tags/{id} - Rename a tag.
pub async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TagRequest>,
) -> ApiResult<Json<TagResponse>> {
    require_name(&request.name, "tag")?;

    let tag = TagRow {
        id,
        name: request.name.trim().to_string(),
    };
    state.metadata.update_tag(&tag).await?;

    Ok(Json(TagResponse {
        id: tag.id.to_string(),
        name: tag.name,
        stamp_count: None,
    }))
}

/// DELETE /api/tags/{id} - Delete a tag and its links to designs.
pub async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.metadata.delete_tag(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
