//! HTML fragment templates for the `/views` and `/htmx` endpoints.
//!
//! Placeholders:
//! - `{...}` markers are substituted by [`render`]; every dynamic value goes
//!   through [`escape_html`] first.

/// One stamp card in the gallery view.
pub const GALLERY_ITEM: &str = r#"<div class="stamp-card{owned_class}" id="stamp-{id}" data-stamp-id="{id}">
  <div class="stamp-card-image">{image}</div>
  <div class="stamp-card-body">
    <span class="stamp-card-title">{name}</span>
    <span class="stamp-card-scott">{scott_number}</span>
  </div>
</div>
"#;

/// One stamp row in the list view.
pub const LIST_ROW: &str = r#"<tr id="stamp-{id}" data-stamp-id="{id}">
  <td>{name}</td>
  <td>{scott_number}</td>
  <td>{series}</td>
  <td>{box_names}</td>
  <td>{tags}</td>
  <td><span class="badge{owned_class}">{owned_label}</span></td>
</tr>
"#;

/// Infinite-scroll sentinel; HTMX replaces it with the next page on reveal.
pub const SCROLL_SENTINEL: &str = r#"<div class="scroll-sentinel" hx-get="{next_url}" hx-trigger="revealed" hx-swap="outerHTML"></div>
"#;

/// Gallery page wrapper.
pub const GALLERY_PAGE: &str = r#"<div class="stamp-gallery" data-page="{page}" data-total-pages="{total_pages}" data-total-items="{total_items}">
{items}{sentinel}</div>
"#;

/// List page wrapper.
pub const LIST_PAGE: &str = r#"<table class="stamp-list" data-page="{page}" data-total-pages="{total_pages}" data-total-items="{total_items}">
<tbody>
{items}{sentinel}</tbody>
</table>
"#;

/// One storage box entry in the sidebar.
pub const BOX_ITEM: &str = r##"<li class="box-entry" data-box-id="{id}">
  <a href="#" hx-get="/views/stamps/list?box_id={id}" hx-target="#content">{name}</a>
  <span class="box-count">{count}</span>
</li>
"##;

/// Storage box sidebar wrapper.
pub const BOXES_LIST: &str = r#"<ul class="box-list">
{items}</ul>
"#;

/// One tag chip on the stamp detail panel.
pub const TAG_CHIP: &str = r#"<span class="tag-chip" data-tag="{tag}">{tag}<button hx-delete="/htmx/stamps/{stamp_id}/tags/{tag_encoded}" hx-target="closest .tag-chip" hx-swap="outerHTML"></button></span>
"#;

/// Inline field edit confirmation.
pub const FIELD_SAVED: &str = r#"<span class="field-value" data-field="{field}">{value}</span>
"#;

/// Success alert after saving preferences.
pub const ALERT_SUCCESS: &str = r#"<div class="alert alert-success" role="alert">{message}</div>
"#;

/// Substitute `{key}` markers in `template`. Unknown markers are left as-is.
pub fn render(template: &str, substitutions: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in substitutions {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

/// Minimal HTML escaping for text interpolated into fragments.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
