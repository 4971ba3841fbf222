//! Integration tests for storage boxes, tags, and collection stats.

mod common;

use axum::http::StatusCode;
use common::{create_box, create_instance, create_stamp, json_request, TestServer};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn box_crud_round_trip() {
    let server = TestServer::new().await;

    let id = create_box(&server.router, "Shoebox").await;

    let (status, fetched) =
        json_request(&server.router, "GET", &format!("/api/boxes/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Shoebox");

    let (status, renamed) = json_request(
        &server.router,
        "PUT",
        &format!("/api/boxes/{id}"),
        Some(json!({ "name": "Archive Box" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "Archive Box");

    let (status, _) = json_request(&server.router, "DELETE", &format!("/api/boxes/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = json_request(&server.router, "GET", &format!("/api/boxes/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_box_name_conflicts() {
    let server = TestServer::new().await;
    create_box(&server.router, "Box 1").await;

    let (status, _) = json_request(
        &server.router,
        "POST",
        "/api/boxes",
        Some(json!({ "name": "Box 1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn box_listing_sums_instance_quantities() {
    let server = TestServer::new().await;
    let box_id = create_box(&server.router, "Box 1").await;
    let stamp_a = create_stamp(&server.router, "Lincoln 1c Green", Some("219")).await;
    let stamp_b = create_stamp(&server.router, "Washington 2c Carmine", Some("220")).await;
    create_instance(&server.router, &stamp_a, Some("Used"), Some(&box_id), 3).await;
    create_instance(&server.router, &stamp_b, Some("Mint"), Some(&box_id), 2).await;

    let (status, boxes) = json_request(&server.router, "GET", "/api/boxes", None).await;
    assert_eq!(status, StatusCode::OK);
    let entry = boxes
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["id"] == box_id.as_str())
        .expect("box in listing");
    assert_eq!(entry["stamp_count"], 5);
}

#[tokio::test]
async fn deleting_a_box_orphans_but_keeps_instances() {
    let server = TestServer::new().await;
    let box_id = create_box(&server.router, "Box 1").await;
    let stamp_id = create_stamp(&server.router, "Lincoln 1c Green", Some("219")).await;
    let (_, instance) =
        create_instance(&server.router, &stamp_id, Some("Used"), Some(&box_id), 2).await;
    let instance_id = instance["id"].as_str().unwrap();

    let (status, _) =
        json_request(&server.router, "DELETE", &format!("/api/boxes/{box_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The instance survived, without a shelf location
    let (status, orphaned) = json_request(
        &server.router,
        "GET",
        &format!("/api/instances/{instance_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(orphaned.get("box_id").is_none(), "{orphaned}");
    assert!(orphaned.get("box_name").is_none());
    assert_eq!(orphaned["quantity"], 2);

    // Ownership is untouched
    let (_, stamp) =
        json_request(&server.router, "GET", &format!("/api/stamps/{stamp_id}"), None).await;
    assert_eq!(stamp["is_owned"], true);
}

#[tokio::test]
async fn tag_listing_counts_designs() {
    let server = TestServer::new().await;
    let stamp_a = create_stamp(&server.router, "Lincoln 1c Green", Some("219")).await;
    let stamp_b = create_stamp(&server.router, "Washington 2c Carmine", Some("220")).await;

    for id in [&stamp_a, &stamp_b] {
        json_request(
            &server.router,
            "PUT",
            &format!("/api/stamps/{id}"),
            Some(json!({ "tags": ["US Classics"] })),
        )
        .await;
    }

    let (status, tags) = json_request(&server.router, "GET", "/api/tags", None).await;
    assert_eq!(status, StatusCode::OK);
    let entry = tags
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "US Classics")
        .expect("tag in listing");
    assert_eq!(entry["stamp_count"], 2);
}

#[tokio::test]
async fn tag_crud_and_conflicts() {
    let server = TestServer::new().await;

    let (status, tag) = json_request(
        &server.router,
        "POST",
        "/api/tags",
        Some(json!({ "name": "Airmail" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tag_id = tag["id"].as_str().unwrap();

    let (status, _) = json_request(
        &server.router,
        "POST",
        "/api/tags",
        Some(json!({ "name": "Airmail" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, renamed) = json_request(
        &server.router,
        "PUT",
        &format!("/api/tags/{tag_id}"),
        Some(json!({ "name": "Air Post" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "Air Post");

    let (status, _) = json_request(
        &server.router,
        "PUT",
        &format!("/api/tags/{}", Uuid::new_v4()),
        Some(json!({ "name": "Ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_tag_detaches_it_from_designs() {
    let server = TestServer::new().await;
    let stamp_id = create_stamp(&server.router, "Lincoln 1c Green", Some("219")).await;
    json_request(
        &server.router,
        "PUT",
        &format!("/api/stamps/{stamp_id}"),
        Some(json!({ "tags": ["US Classics", "19th Century"] })),
    )
    .await;

    let (_, tags) = json_request(&server.router, "GET", "/api/tags", None).await;
    let tag_id = tags
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "US Classics")
        .expect("tag")["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, _) =
        json_request(&server.router, "DELETE", &format!("/api/tags/{tag_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, stamp) =
        json_request(&server.router, "GET", &format!("/api/stamps/{stamp_id}"), None).await;
    assert_eq!(stamp["tags"], json!(["19th Century"]));
}

#[tokio::test]
async fn stats_aggregate_the_collection() {
    let server = TestServer::new().await;
    let box_id = create_box(&server.router, "Box 1").await;
    let owned = create_stamp(&server.router, "Lincoln 1c Green", Some("219")).await;
    create_stamp(&server.router, "Washington 2c Carmine", Some("220")).await;
    create_stamp(&server.router, "Unnumbered Local", None).await;
    create_instance(&server.router, &owned, Some("Used"), Some(&box_id), 3).await;
    create_instance(&server.router, &owned, Some("Mint"), None, 2).await;

    let (status, stats) = json_request(&server.router, "GET", "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_owned"], 5);
    assert_eq!(stats["unique_stamps"], 2);
    assert_eq!(stats["stamps_needed"], 2);
    assert_eq!(stats["storage_boxes"], 1);
}
