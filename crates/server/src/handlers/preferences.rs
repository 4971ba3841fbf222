//! User preference endpoints.

use crate::error::ApiResult;
use crate::preferences::preferences_set_cookie;
use crate::templates::{render, ALERT_SUCCESS};
use axum::extract::Form;
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use stampkeeper_core::preferences::UserPreferences;

/// GET /api/preferences - Current preferences (cookie or defaults).
pub async fn get_preferences(
    Extension(prefs): Extension<UserPreferences>,
) -> ApiResult<Json<UserPreferences>> {
    Ok(Json(prefs))
}

/// Form fields for saving preferences; absent fields keep their current
/// value, mirroring the settings form which submits only what changed.
#[derive(Debug, Deserialize)]
pub struct PreferencesForm {
    #[serde(rename = "defaultView")]
    pub default_view: Option<String>,
    #[serde(rename = "defaultSort")]
    pub default_sort: Option<String>,
    #[serde(rename = "sortDirection")]
    pub sort_direction: Option<String>,
    #[serde(rename = "itemsPerPage")]
    pub items_per_page: Option<i64>,
}

/// POST /api/preferences - Merge submitted fields into the cookie and answer
/// with an HTMX-friendly confirmation fragment.
pub async fn save_preferences(
    Extension(current): Extension<UserPreferences>,
    Form(form): Form<PreferencesForm>,
) -> ApiResult<Response> {
    let mut prefs = current;
    if let Some(view) = form.default_view {
        prefs.default_view = view;
    }
    if let Some(sort) = form.default_sort {
        prefs.default_sort = sort;
    }
    if let Some(direction) = form.sort_direction {
        prefs.sort_direction = direction;
    }
    if let Some(items) = form.items_per_page {
        prefs.items_per_page = items;
    }
    let prefs = prefs.sanitized();

    let body = Html(render(
        ALERT_SUCCESS,
        &[("message", "Preferences saved successfully!")],
    ));
    Ok((
        [(header::SET_COOKIE, preferences_set_cookie(&prefs))],
        body,
    )
        .into_response())
}
