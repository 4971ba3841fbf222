//! Stamp design endpoints.

use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{none_if_empty, require_name, rfc3339};
use crate::handlers::instances::InstanceResponse;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use stampkeeper_core::listing::{
    OwnedFilter, SortDirection, SortKey, StampFilters, DEFAULT_PAGE_SIZE,
};
use stampkeeper_core::preferences::UserPreferences;
use stampkeeper_metadata::models::{StampDetails, StampPatch, StampRow};
use time::OffsetDateTime;
use uuid::Uuid;

/// Query parameters for stamp listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListStampsQuery {
    pub search: Option<String>,
    pub owned: Option<String>,
    pub owned_filter: Option<String>,
    pub box_id: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ListStampsQuery {
    /// Fill unset sort/order/limit from the user's preferences. Used by the
    /// view endpoints; the JSON API takes the query as-is.
    pub(crate) fn with_preference_defaults(mut self, prefs: &UserPreferences) -> Self {
        if self.sort.is_none() {
            self.sort = Some(prefs.default_sort.clone());
        }
        if self.order.is_none() {
            self.order = Some(prefs.sort_direction.clone());
        }
        if self.limit.is_none() {
            self.limit = Some(prefs.items_per_page);
        }
        self
    }

    /// The requested page, clamped to 1.
    pub(crate) fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Convert to listing filters. An unparsable box id is a 400; an empty
    /// one means "no box filter".
    pub(crate) fn into_filters(self) -> ApiResult<StampFilters> {
        let box_id = match self.box_id.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                Uuid::parse_str(raw)
                    .map_err(|_| ApiError::BadRequest(format!("invalid box id: {raw}")))?,
            ),
        };
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
        Ok(StampFilters {
            search: self.search.filter(|s| !s.is_empty()),
            owned: OwnedFilter::from_params(self.owned.as_deref(), self.owned_filter.as_deref()),
            box_id,
            sort: SortKey::parse(self.sort.as_deref()),
            order: SortDirection::parse(self.order.as_deref()),
            limit,
            offset: (page - 1) * limit,
        })
    }
}

/// Stamp design as served by the API.
#[derive(Debug, Serialize)]
pub struct StampResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scott_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub is_owned: bool,
    pub date_added: String,
    pub date_modified: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub instances: Vec<InstanceResponse>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub box_names: Vec<String>,
}

impl StampResponse {
    pub(crate) fn from_details(details: &StampDetails) -> ApiResult<Self> {
        let instances = details
            .instances
            .iter()
            .map(InstanceResponse::from_details)
            .collect::<ApiResult<Vec<_>>>()?;
        Ok(Self {
            id: details.stamp.id.to_string(),
            name: details.stamp.name.clone(),
            scott_number: details.stamp.scott_number.clone(),
            issue_date: details.stamp.issue_date.clone(),
            series: details.stamp.series.clone(),
            notes: details.stamp.notes.clone(),
            image_url: details.stamp.image_url.clone(),
            is_owned: details.is_owned,
            date_added: rfc3339(details.stamp.date_added)?,
            date_modified: rfc3339(details.stamp.date_modified)?,
            tags: details.tags.clone(),
            instances,
            box_names: details.box_names.clone(),
        })
    }
}

/// Request body for creating a stamp design.
#[derive(Debug, Deserialize)]
pub struct CreateStampRequest {
    pub name: String,
    #[serde(default)]
    pub scott_number: Option<String>,
    #[serde(default)]
    pub issue_date: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// GET /api/stamps - One page of designs matching the filters.
pub async fn list_stamps(
    State(state): State<AppState>,
    Query(query): Query<ListStampsQuery>,
) -> ApiResult<Json<Vec<StampResponse>>> {
    let filters = query.into_filters()?;
    let stamps = state.metadata.list_stamps(&filters).await?;
    let responses = stamps
        .iter()
        .map(StampResponse::from_details)
        .collect::<ApiResult<Vec<_>>>()?;
    Ok(Json(responses))
}

/// GET /api/stamps/{id} - Single design with tags and instances.
pub async fn get_stamp(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StampResponse>> {
    let details = state
        .metadata
        .get_stamp(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("stamp not found".to_string()))?;
    Ok(Json(StampResponse::from_details(&details)?))
}

/// POST /api/stamps - Create a design.
pub async fn create_stamp(
    State(state): State<AppState>,
    Json(request): Json<CreateStampRequest>,
) -> ApiResult<(StatusCode, Json<StampResponse>)> {
    require_name(&request.name, "stamp")?;

    let now = OffsetDateTime::now_utc();
    let stamp = StampRow {
        id: Uuid::new_v4(),
        name: request.name.trim().to_string(),
        scott_number: none_if_empty(request.scott_number),
        issue_date: none_if_empty(request.issue_date),
        series: none_if_empty(request.series),
        notes: none_if_empty(request.notes),
        image_url: none_if_empty(request.image_url),
        date_added: now,
        date_modified: now,
    };

    state.metadata.create_stamp(&stamp, &request.tags).await?;

    let details = state
        .metadata
        .get_stamp(stamp.id)
        .await?
        .ok_or_else(|| ApiError::Internal("created stamp could not be read back".to_string()))?;
    Ok((StatusCode::CREATED, Json(StampResponse::from_details(&details)?)))
}

/// PUT /api/stamps/{id} - Partial update; absent fields are left unchanged.
pub async fn update_stamp(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<StampPatch>,
) -> ApiResult<Json<StampResponse>> {
    if let Some(name) = &patch.name {
        require_name(name, "stamp")?;
    }

    let existing = state
        .metadata
        .get_stamp(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("stamp not found".to_string()))?;

    let mut updated = patch.apply(&existing.stamp);
    updated.date_modified = OffsetDateTime::now_utc();
    state.metadata.update_stamp(&updated).await?;

    if let Some(tags) = &patch.tags {
        state.metadata.set_stamp_tags(id, tags).await?;
    }

    let details = state
        .metadata
        .get_stamp(id)
        .await?
        .ok_or_else(|| ApiError::Internal("updated stamp could not be read back".to_string()))?;
    Ok(Json(StampResponse::from_details(&details)?))
}

/// DELETE /api/stamps/{id} - Soft delete; cascades to instances and tag links.
pub async fn delete_stamp(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .metadata
        .delete_stamp(id, OffsetDateTime::now_utc())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
