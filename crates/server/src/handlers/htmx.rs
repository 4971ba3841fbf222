//! HTMX endpoints: inline single-field edits and tag add/remove chips.

use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{none_if_empty, require_name, urlencode};
use crate::state::AppState;
use crate::templates::{escape_html, render, FIELD_SAVED, TAG_CHIP};
use axum::extract::{Form, Path, State};
use axum::response::Html;
use serde::Deserialize;
use stampkeeper_metadata::models::StampPatch;
use time::OffsetDateTime;
use uuid::Uuid;

/// Form body for an inline field edit.
#[derive(Debug, Deserialize)]
pub struct FieldForm {
    pub value: String,
}

/// POST /htmx/stamps/{id}/field/{field} - Write one field of a design and
/// answer with the refreshed field markup.
pub async fn update_stamp_field(
    State(state): State<AppState>,
    Path((id, field)): Path<(Uuid, String)>,
    Form(form): Form<FieldForm>,
) -> ApiResult<Html<String>> {
    let value = form.value;
    let mut patch = StampPatch::default();
    match field.as_str() {
        "name" => {
            require_name(&value, "stamp")?;
            patch.name = Some(value.trim().to_string());
        }
        "scott_number" => patch.scott_number = Some(none_if_empty(Some(value.clone()))),
        "issue_date" => patch.issue_date = Some(none_if_empty(Some(value.clone()))),
        "series" => patch.series = Some(none_if_empty(Some(value.clone()))),
        "notes" => patch.notes = Some(none_if_empty(Some(value.clone()))),
        "image_url" => patch.image_url = Some(none_if_empty(Some(value.clone()))),
        other => {
            return Err(ApiError::BadRequest(format!("unknown field: {other}")));
        }
    }

    let existing = state
        .metadata
        .get_stamp(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("stamp not found".to_string()))?;

    let mut updated = patch.apply(&existing.stamp);
    updated.date_modified = OffsetDateTime::now_utc();
    state.metadata.update_stamp(&updated).await?;

    Ok(Html(render(
        FIELD_SAVED,
        &[("field", field.as_str()), ("value", &escape_html(value.trim()))],
    )))
}

/// Form body for adding a tag.
#[derive(Debug, Deserialize)]
pub struct TagForm {
    pub tag: String,
}

/// POST /htmx/stamps/{id}/tags - Attach a tag and answer with its chip.
/// Re-adding an attached tag is a no-op that still renders the chip.
pub async fn add_stamp_tag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<TagForm>,
) -> ApiResult<Html<String>> {
    let tag = form.tag.trim().to_string();
    require_name(&tag, "tag")?;

    let existing = state
        .metadata
        .get_stamp(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("stamp not found".to_string()))?;

    let mut tags = existing.tags;
    if !tags.contains(&tag) {
        tags.push(tag.clone());
        state.metadata.set_stamp_tags(id, &tags).await?;
    }

    Ok(Html(render(
        TAG_CHIP,
        &[
            ("tag", &escape_html(&tag)),
            ("stamp_id", &id.to_string()),
            ("tag_encoded", &urlencode(&tag)),
        ],
    )))
}

/// DELETE /htmx/stamps/{id}/tags/{tag} - Detach a tag; the chip disappears,
/// so the response body is empty.
pub async fn remove_stamp_tag(
    State(state): State<AppState>,
    Path((id, tag)): Path<(Uuid, String)>,
) -> ApiResult<Html<String>> {
    let existing = state
        .metadata
        .get_stamp(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("stamp not found".to_string()))?;

    let tags: Vec<String> = existing.tags.into_iter().filter(|t| *t != tag).collect();
    state.metadata.set_stamp_tags(id, &tags).await?;

    Ok(Html(String::new()))
}
