//! Stamp instance endpoints.
//!
//! One path serves both roles the way the classic API shaped it:
//! POST /api/instances/{stamp_id} creates under a design, while
//! GET/PUT/DELETE /api/instances/{instance_id} address one instance.

use crate::error::{ApiError, ApiResult};
use crate::handlers::common::rfc3339;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use stampkeeper_metadata::models::{InstanceDetails, InstancePatch, InstanceRow};
use time::OffsetDateTime;
use uuid::Uuid;

/// Instance as served by the API.
#[derive(Debug, Serialize)]
pub struct InstanceResponse {
    pub id: String,
    pub stamp_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_name: Option<String>,
    pub quantity: i64,
    pub date_added: String,
    pub date_modified: String,
}

impl InstanceResponse {
    pub(crate) fn from_details(details: &InstanceDetails) -> ApiResult<Self> {
        Ok(Self {
            id: details.id.to_string(),
            stamp_id: details.stamp_id.to_string(),
            condition: details.condition.clone(),
            box_id: details.box_id.map(|id| id.to_string()),
            box_name: details.box_name.clone(),
            quantity: details.quantity,
            date_added: rfc3339(details.date_added)?,
            date_modified: rfc3339(details.date_modified)?,
        })
    }
}

/// Request body for creating an instance.
#[derive(Debug, Deserialize)]
pub struct CreateInstanceRequest {
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub box_id: Option<Uuid>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// POST /api/instances/{stamp_id} - Add copies of a design.
pub async fn create_instance(
    State(state): State<AppState>,
    Path(stamp_id): Path<Uuid>,
    Json(request): Json<CreateInstanceRequest>,
) -> ApiResult<(StatusCode, Json<InstanceResponse>)> {
    // The design must exist and be live; otherwise the insert would only
    // fail later on the foreign key.
    state
        .metadata
        .get_stamp(stamp_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("stamp not found".to_string()))?;

    let now = OffsetDateTime::now_utc();
    let instance = InstanceRow {
        id: Uuid::new_v4(),
        stamp_id,
        condition: request.condition.filter(|c| !c.is_empty()),
        box_id: request.box_id,
        quantity: request.quantity.filter(|q| *q > 0).unwrap_or(1),
        date_added: now,
        date_modified: now,
    };

    state.metadata.create_instance(&instance).await?;

    let details = state
        .metadata
        .get_instance(instance.id)
        .await?
        .ok_or_else(|| ApiError::Internal("created instance could not be read back".to_string()))?;
    Ok((
        StatusCode::CREATED,
        Json(InstanceResponse::from_details(&details)?),
    ))
}

/// GET /api/instances/{instance_id} - Single instance with its box name.
pub async fn get_instance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<InstanceResponse>> {
    let details = state
        .metadata
        .get_instance(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("instance not found".to_string()))?;
    Ok(Json(InstanceResponse::from_details(&details)?))
}

/// PUT /api/instances/{instance_id} - Partial update. Patching the quantity
/// to zero (or below) deletes the instance and answers 204.
pub async fn update_instance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<InstancePatch>,
) -> ApiResult<Response> {
    let existing = state
        .metadata
        .get_instance(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("instance not found".to_string()))?;

    let mut updated = patch.apply(&existing.to_row());
    updated.date_modified = OffsetDateTime::now_utc();

    if updated.quantity <= 0 {
        state
            .metadata
            .delete_instance(id, OffsetDateTime::now_utc())
            .await?;
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    state.metadata.update_instance(&updated).await?;

    let details = state
        .metadata
        .get_instance(id)
        .await?
        .ok_or_else(|| ApiError::Internal("updated instance could not be read back".to_string()))?;
    Ok(Json(InstanceResponse::from_details(&details)?).into_response())
}

/// DELETE /api/instances/{instance_id} - Soft delete.
pub async fn delete_instance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .metadata
        .delete_instance(id, OffsetDateTime::now_utc())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
