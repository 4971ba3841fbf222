//! Integration tests for preference cookies and the HTML fragment views.

mod common;

use axum::http::StatusCode;
use common::{
    create_box, create_instance, create_stamp, form_request, json_request, text_request,
    TestServer,
};
use serde_json::json;

/// Extract the preference cookie pair ("name=value") from a Set-Cookie header.
fn preference_cookie(headers: &axum::http::HeaderMap) -> String {
    let value = headers
        .get("set-cookie")
        .expect("Set-Cookie header")
        .to_str()
        .expect("header text");
    value
        .split(';')
        .next()
        .expect("cookie pair")
        .trim()
        .to_string()
}

#[tokio::test]
async fn preferences_default_without_a_cookie() {
    let server = TestServer::new().await;

    let (status, prefs) = json_request(&server.router, "GET", "/api/preferences", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prefs["defaultView"], "gallery");
    assert_eq!(prefs["defaultSort"], "name");
    assert_eq!(prefs["sortDirection"], "ASC");
    assert_eq!(prefs["itemsPerPage"], 50);
}

#[tokio::test]
async fn saving_preferences_round_trips_through_the_cookie() {
    let server = TestServer::new().await;

    let (status, headers, body) = form_request(
        &server.router,
        "POST",
        "/api/preferences",
        "defaultView=list&defaultSort=issue_date&sortDirection=DESC&itemsPerPage=25",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Preferences saved"));

    let cookie = preference_cookie(&headers);
    let (status, body) =
        common::json_get_with_cookie(&server.router, "/api/preferences", &cookie).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["defaultView"], "list");
    assert_eq!(body["defaultSort"], "issue_date");
    assert_eq!(body["sortDirection"], "DESC");
    assert_eq!(body["itemsPerPage"], 25);
}

#[tokio::test]
async fn saving_merges_into_the_existing_cookie_and_clamps() {
    let server = TestServer::new().await;

    let (_, headers, _) = form_request(
        &server.router,
        "POST",
        "/api/preferences",
        "defaultView=list",
        None,
    )
    .await;
    let cookie = preference_cookie(&headers);

    // Only itemsPerPage submitted; the view sticks, the bogus size clamps
    let (_, headers, _) = form_request(
        &server.router,
        "POST",
        "/api/preferences",
        "itemsPerPage=100000",
        Some(&cookie),
    )
    .await;
    let cookie = preference_cookie(&headers);

    let (_, prefs) =
        common::json_get_with_cookie(&server.router, "/api/preferences", &cookie).await;
    assert_eq!(prefs["defaultView"], "list");
    assert_eq!(prefs["itemsPerPage"], 50);
}

#[tokio::test]
async fn gallery_view_renders_a_page_of_cards() {
    let server = TestServer::new().await;
    create_stamp(&server.router, "Lincoln 1c Green", Some("219")).await;
    create_stamp(&server.router, "Washington 2c Carmine", Some("220")).await;

    let (status, html) = text_request(&server.router, "/views/stamps/gallery", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"class="stamp-gallery""#));
    assert!(html.contains("Lincoln 1c Green"));
    assert!(html.contains("Washington 2c Carmine"));
    assert!(html.contains(r#"data-total-items="2""#));
    // Everything fits on one page; no scroll sentinel
    assert!(!html.contains("scroll-sentinel"));
}

#[tokio::test]
async fn list_view_marks_ownership() {
    let server = TestServer::new().await;
    let owned = create_stamp(&server.router, "Lincoln 1c Green", Some("219")).await;
    create_stamp(&server.router, "Washington 2c Carmine", Some("220")).await;
    create_instance(&server.router, &owned, Some("Used"), None, 1).await;

    let (status, html) = text_request(&server.router, "/views/stamps/list", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"class="stamp-list""#));
    assert!(html.contains("Owned"));
    assert!(html.contains("Needed"));
}

#[tokio::test]
async fn unknown_view_is_rejected() {
    let server = TestServer::new().await;

    let (status, _) = text_request(&server.router, "/views/stamps/carousel", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scroll_pages_chain_through_sentinels() {
    let server = TestServer::new().await;
    for i in 0..5 {
        create_stamp(&server.router, &format!("Design {i}"), Some(&format!("{}", 100 + i))).await;
    }

    let (status, page1) = text_request(&server.router, "/views/stamps/gallery?limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page1.contains("scroll-sentinel"));
    assert!(page1.contains("/views/stamps/gallery/scroll?page=2"));
    assert!(page1.contains("limit=2"));

    let (status, page2) =
        text_request(&server.router, "/views/stamps/gallery/scroll?page=2&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page2.contains("/views/stamps/gallery/scroll?page=3"));

    // The final page carries no sentinel
    let (status, page3) =
        text_request(&server.router, "/views/stamps/gallery/scroll?page=3&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!page3.contains("scroll-sentinel"));
}

#[tokio::test]
async fn boxes_fragment_lists_names_and_counts() {
    let server = TestServer::new().await;
    let box_id = create_box(&server.router, "Shoebox").await;
    let stamp_id = create_stamp(&server.router, "Lincoln 1c Green", Some("219")).await;
    create_instance(&server.router, &stamp_id, Some("Used"), Some(&box_id), 3).await;

    let (status, html) = text_request(&server.router, "/views/boxes-list", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Shoebox"));
    assert!(html.contains(r#"<span class="box-count">3</span>"#));
}

#[tokio::test]
async fn default_view_follows_the_preference_cookie() {
    let server = TestServer::new().await;
    create_stamp(&server.router, "Lincoln 1c Green", Some("219")).await;

    // Without a cookie: the gallery
    let (status, html) = text_request(&server.router, "/views/default", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"class="stamp-gallery""#));

    let (_, headers, _) = form_request(
        &server.router,
        "POST",
        "/api/preferences",
        "defaultView=list",
        None,
    )
    .await;
    let cookie = preference_cookie(&headers);

    let (status, html) = text_request(&server.router, "/views/default", Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"class="stamp-list""#));
}

#[tokio::test]
async fn inline_field_edit_writes_through() {
    let server = TestServer::new().await;
    let id = create_stamp(&server.router, "Lincoln 1c Green", Some("219")).await;

    let (status, _, html) = form_request(
        &server.router,
        "POST",
        &format!("/htmx/stamps/{id}/field/series"),
        "value=1890-93+Regular+Issue",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("1890-93 Regular Issue"));

    let (_, stamp) = json_request(&server.router, "GET", &format!("/api/stamps/{id}"), None).await;
    assert_eq!(stamp["series"], "1890-93 Regular Issue");

    // Unknown field names are rejected
    let (status, _, _) = form_request(
        &server.router,
        "POST",
        &format!("/htmx/stamps/{id}/field/bogus"),
        "value=x",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // An empty value clears the nullable column
    let (status, _, _) = form_request(
        &server.router,
        "POST",
        &format!("/htmx/stamps/{id}/field/series"),
        "value=",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, stamp) = json_request(&server.router, "GET", &format!("/api/stamps/{id}"), None).await;
    assert!(stamp.get("series").is_none(), "{stamp}");
}

#[tokio::test]
async fn tag_chips_add_and_remove() {
    let server = TestServer::new().await;
    let id = create_stamp(&server.router, "Lincoln 1c Green", Some("219")).await;

    let (status, _, chip) = form_request(
        &server.router,
        "POST",
        &format!("/htmx/stamps/{id}/tags"),
        "tag=US+Classics",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(chip.contains(r#"data-tag="US Classics""#));
    assert!(chip.contains("US%20Classics"));

    // Re-adding is a no-op that still renders the chip
    let (status, _, _) = form_request(
        &server.router,
        "POST",
        &format!("/htmx/stamps/{id}/tags"),
        "tag=US+Classics",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, stamp) = json_request(&server.router, "GET", &format!("/api/stamps/{id}"), None).await;
    assert_eq!(stamp["tags"], json!(["US Classics"]));

    let (status, _, body) = form_request(
        &server.router,
        "DELETE",
        &format!("/htmx/stamps/{id}/tags/US%20Classics"),
        "",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    let (_, stamp) = json_request(&server.router, "GET", &format!("/api/stamps/{id}"), None).await;
    assert!(stamp.get("tags").is_none(), "{stamp}");
}
