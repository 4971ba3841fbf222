//! HTML-fragment view endpoints (gallery/list pages, infinite scroll, box
//! sidebar). These render the same listing queries as the JSON API into
//! partial markup for HTMX swaps.

use crate::error::{ApiError, ApiResult};
use crate::handlers::common::urlencode;
use crate::handlers::stamps::ListStampsQuery;
use crate::state::AppState;
use crate::templates::{
    escape_html, render, BOXES_LIST, BOX_ITEM, GALLERY_ITEM, GALLERY_PAGE, LIST_PAGE, LIST_ROW,
    SCROLL_SENTINEL,
};
use axum::extract::{Path, Query, State};
use axum::response::Html;
use axum::Extension;
use stampkeeper_core::preferences::UserPreferences;
use stampkeeper_metadata::models::StampDetails;

/// Calculated pagination data for one listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub(crate) fn new(page: i64, limit: i64, total_items: i64) -> Self {
        let mut total_pages = total_items / limit + 1;
        if total_items % limit == 0 && total_items > 0 {
            total_pages -= 1;
        }
        Self {
            current_page: page,
            total_pages,
            total_items,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// The two stamp views.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ViewKind {
    Gallery,
    List,
}

impl ViewKind {
    fn parse(raw: &str) -> ApiResult<Self> {
        match raw {
            "gallery" => Ok(Self::Gallery),
            "list" => Ok(Self::List),
            other => Err(ApiError::BadRequest(format!("unknown view: {other}"))),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Gallery => "gallery",
            Self::List => "list",
        }
    }
}

fn render_gallery_item(details: &StampDetails) -> String {
    let name = escape_html(&details.stamp.name);
    let image = match &details.stamp.image_url {
        Some(url) => format!(
            r#"<img src="{}" alt="{name}">"#,
            escape_html(url)
        ),
        None => r#"<div class="stamp-placeholder"></div>"#.to_string(),
    };
    render(
        GALLERY_ITEM,
        &[
            ("id", &details.stamp.id.to_string()),
            ("name", &name),
            (
                "scott_number",
                &details
                    .stamp
                    .scott_number
                    .as_deref()
                    .map(escape_html)
                    .unwrap_or_default(),
            ),
            ("image", &image),
            ("owned_class", if details.is_owned { " owned" } else { " needed" }),
        ],
    )
}

fn render_list_row(details: &StampDetails) -> String {
    render(
        LIST_ROW,
        &[
            ("id", &details.stamp.id.to_string()),
            ("name", &escape_html(&details.stamp.name)),
            (
                "scott_number",
                &details
                    .stamp
                    .scott_number
                    .as_deref()
                    .map(escape_html)
                    .unwrap_or_default(),
            ),
            (
                "series",
                &details
                    .stamp
                    .series
                    .as_deref()
                    .map(escape_html)
                    .unwrap_or_default(),
            ),
            ("box_names", &escape_html(&details.box_names.join(", "))),
            ("tags", &escape_html(&details.tags.join(", "))),
            ("owned_class", if details.is_owned { " owned" } else { " needed" }),
            ("owned_label", if details.is_owned { "Owned" } else { "Needed" }),
        ],
    )
}

/// URL for the next scroll page, preserving the active filters.
fn scroll_url(view: ViewKind, query: &ListStampsQuery, next_page: i64) -> String {
    let mut params = vec![format!("page={next_page}")];
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        params.push(format!("search={}", urlencode(search)));
    }
    if let Some(owned) = query.owned.as_deref() {
        params.push(format!("owned={}", urlencode(owned)));
    }
    if let Some(owned_filter) = query.owned_filter.as_deref() {
        params.push(format!("owned_filter={}", urlencode(owned_filter)));
    }
    if let Some(box_id) = query.box_id.as_deref().filter(|s| !s.is_empty()) {
        params.push(format!("box_id={}", urlencode(box_id)));
    }
    if let Some(sort) = query.sort.as_deref() {
        params.push(format!("sort={}", urlencode(sort)));
    }
    if let Some(order) = query.order.as_deref() {
        params.push(format!("order={}", urlencode(order)));
    }
    if let Some(limit) = query.limit {
        params.push(format!("limit={limit}"));
    }
    format!(
        "/views/stamps/{}/scroll?{}",
        view.as_str(),
        params.join("&")
    )
}

fn render_items(view: ViewKind, stamps: &[StampDetails]) -> String {
    stamps
        .iter()
        .map(|details| match view {
            ViewKind::Gallery => render_gallery_item(details),
            ViewKind::List => render_list_row(details),
        })
        .collect()
}

/// Load one page plus its pagination data for a (preference-defaulted) query.
async fn load_page(
    state: &AppState,
    query: &ListStampsQuery,
) -> ApiResult<(Vec<StampDetails>, Pagination)> {
    let filters = query.clone().into_filters()?;
    let total_items = state.metadata.count_stamps(&filters).await?;
    let stamps = state.metadata.list_stamps(&filters).await?;
    let pagination = Pagination::new(query.page(), filters.limit, total_items);
    Ok((stamps, pagination))
}

async fn render_stamps_page(
    state: &AppState,
    view: ViewKind,
    query: ListStampsQuery,
) -> ApiResult<Html<String>> {
    let (stamps, pagination) = load_page(state, &query).await?;

    let sentinel = if pagination.has_next {
        render(
            SCROLL_SENTINEL,
            &[(
                "next_url",
                scroll_url(view, &query, pagination.current_page + 1).as_str(),
            )],
        )
    } else {
        String::new()
    };

    let wrapper = match view {
        ViewKind::Gallery => GALLERY_PAGE,
        ViewKind::List => LIST_PAGE,
    };
    Ok(Html(render(
        wrapper,
        &[
            ("items", render_items(view, &stamps).as_str()),
            ("sentinel", &sentinel),
            ("page", &pagination.current_page.to_string()),
            ("total_pages", &pagination.total_pages.to_string()),
            ("total_items", &pagination.total_items.to_string()),
        ],
    )))
}

/// GET /views/stamps/{view} - One page of stamps as markup.
pub async fn stamps_view(
    State(state): State<AppState>,
    Path(view): Path<String>,
    Extension(prefs): Extension<UserPreferences>,
    Query(query): Query<ListStampsQuery>,
) -> ApiResult<Html<String>> {
    let view = ViewKind::parse(&view)?;
    let query = query.with_preference_defaults(&prefs);
    render_stamps_page(&state, view, query).await
}

/// GET /views/stamps/{view}/scroll - Subsequent pages for infinite scroll:
/// bare items plus the next sentinel.
pub async fn stamps_scroll(
    State(state): State<AppState>,
    Path(view): Path<String>,
    Extension(prefs): Extension<UserPreferences>,
    Query(query): Query<ListStampsQuery>,
) -> ApiResult<Html<String>> {
    let view = ViewKind::parse(&view)?;
    let query = query.with_preference_defaults(&prefs);
    let (stamps, pagination) = load_page(&state, &query).await?;

    let mut body = render_items(view, &stamps);
    if pagination.has_next {
        body.push_str(&render(
            SCROLL_SENTINEL,
            &[(
                "next_url",
                scroll_url(view, &query, pagination.current_page + 1).as_str(),
            )],
        ));
    }
    Ok(Html(body))
}

/// GET /views/boxes-list - Storage box sidebar fragment.
pub async fn boxes_view(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let boxes = state.metadata.list_boxes().await?;
    let items: String = boxes
        .iter()
        .map(|summary| {
            render(
                BOX_ITEM,
                &[
                    ("id", summary.id.to_string().as_str()),
                    ("name", &escape_html(&summary.name)),
                    ("count", &summary.instance_count.to_string()),
                ],
            )
        })
        .collect();
    Ok(Html(render(BOXES_LIST, &[("items", items.as_str())])))
}

/// GET /views/default - The user's preferred view with their sort settings.
pub async fn default_view(
    State(state): State<AppState>,
    Extension(prefs): Extension<UserPreferences>,
) -> ApiResult<Html<String>> {
    let view = ViewKind::parse(&prefs.default_view)?;
    let query = ListStampsQuery::default().with_preference_defaults(&prefs);
    render_stamps_page(&state, view, query).await
}
