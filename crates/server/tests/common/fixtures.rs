//! Request helpers and data fixtures.

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Issue a JSON request and decode the JSON response body (Null when empty
/// or not JSON).
#[allow(dead_code)]
pub async fn json_request(
    router: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, _, bytes) = raw_request(router, method, uri, body, None, None).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Issue a form-encoded request (optionally with a Cookie header) and return
/// status, response headers, and the body as text.
#[allow(dead_code)]
pub async fn form_request(
    router: &axum::Router,
    method: &str,
    uri: &str,
    form: &str,
    cookie: Option<&str>,
) -> (StatusCode, HeaderMap, String) {
    let (status, headers, bytes) = raw_request(
        router,
        method,
        uri,
        None,
        Some((form.to_string(), "application/x-www-form-urlencoded")),
        cookie,
    )
    .await;
    (status, headers, String::from_utf8_lossy(&bytes).into_owned())
}

/// Issue a GET with a Cookie header and decode the JSON response body.
#[allow(dead_code)]
pub async fn json_get_with_cookie(
    router: &axum::Router,
    uri: &str,
    cookie: &str,
) -> (StatusCode, Value) {
    let (status, _, bytes) = raw_request(router, "GET", uri, None, None, Some(cookie)).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Issue a GET (optionally with a Cookie header) and return the body as text.
#[allow(dead_code)]
pub async fn text_request(
    router: &axum::Router,
    uri: &str,
    cookie: Option<&str>,
) -> (StatusCode, String) {
    let (status, _, bytes) = raw_request(router, "GET", uri, None, None, cookie).await;
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

async fn raw_request(
    router: &axum::Router,
    method: &str,
    uri: &str,
    json_body: Option<Value>,
    text_body: Option<(String, &str)>,
    cookie: Option<&str>,
) -> (StatusCode, HeaderMap, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("Cookie", cookie);
    }

    let body = match (json_body, text_body) {
        (Some(value), _) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&value).unwrap())
        }
        (None, Some((text, content_type))) => {
            builder = builder.header("Content-Type", content_type);
            Body::from(text)
        }
        (None, None) => Body::empty(),
    };

    let request = builder.body(body).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    (status, headers, bytes)
}

/// Create a stamp via the API; returns its id.
#[allow(dead_code)]
pub async fn create_stamp(router: &axum::Router, name: &str, scott_number: Option<&str>) -> String {
    let mut body = json!({ "name": name });
    if let Some(scott) = scott_number {
        body["scott_number"] = json!(scott);
    }
    let (status, value) = json_request(router, "POST", "/api/stamps", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "create stamp {name}: {value}");
    value["id"].as_str().expect("stamp id").to_string()
}

/// Create a storage box via the API; returns its id.
#[allow(dead_code)]
pub async fn create_box(router: &axum::Router, name: &str) -> String {
    let (status, value) =
        json_request(router, "POST", "/api/boxes", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED, "create box {name}: {value}");
    value["id"].as_str().expect("box id").to_string()
}

/// Create an instance via the API; returns (status, body).
#[allow(dead_code)]
pub async fn create_instance(
    router: &axum::Router,
    stamp_id: &str,
    condition: Option<&str>,
    box_id: Option<&str>,
    quantity: i64,
) -> (StatusCode, Value) {
    let mut body = json!({ "quantity": quantity });
    if let Some(condition) = condition {
        body["condition"] = json!(condition);
    }
    if let Some(box_id) = box_id {
        body["box_id"] = json!(box_id);
    }
    json_request(router, "POST", &format!("/api/instances/{stamp_id}"), Some(body)).await
}

/// Ids of a listing response, in order.
#[allow(dead_code)]
pub fn listing_ids(value: &Value) -> Vec<String> {
    value
        .as_array()
        .expect("listing array")
        .iter()
        .map(|stamp| stamp["id"].as_str().expect("stamp id").to_string())
        .collect()
}

/// Scott numbers of a listing response, in order (None for absent).
#[allow(dead_code)]
pub fn listing_scotts(value: &Value) -> Vec<Option<String>> {
    value
        .as_array()
        .expect("listing array")
        .iter()
        .map(|stamp| stamp["scott_number"].as_str().map(|s| s.to_string()))
        .collect()
}
