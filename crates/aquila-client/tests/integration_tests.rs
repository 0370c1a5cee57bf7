//! Integration tests for aquila-client
//!
//! These tests spin up an in-process mock server and use the client to
//! interact with it. This ensures the pipeline behavior (cookies, CSRF,
//! headers, retries, decoding) stays in sync with what a real server sees.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use serde_json::{json, Value};

use aquila_client::testing::TestServer;
use aquila_client::{
    ClientConfig, ClientError, DataSource, DecodeMode, DetectorType, EventDetector, PointValue,
    RestRequest,
};

// =============================================================================
// Mock Server
// =============================================================================

const SESSION_COOKIE: &str = "AQUILASESSION";

/// In-memory server state shared by the mock handlers
#[derive(Default)]
struct AppState {
    data_sources: Mutex<HashMap<String, Value>>,
    point_values: Mutex<Vec<Value>>,
    failures_left: AtomicU32,
    attempts: AtomicU32,
}

type SharedState = Arc<AppState>;

fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/rest/v2/login", post(login))
        .route("/rest/v2/logout", post(logout))
        .route("/rest/v1/users/current", get(current_user))
        .route("/rest/v3/data-sources", post(create_data_source))
        .route(
            "/rest/v3/data-sources/{xid}",
            get(get_data_source)
                .put(update_data_source)
                .delete(delete_data_source),
        )
        .route("/rest/v3/data-sources/copy/{xid}", put(copy_data_source))
        .route("/rest/v3/event-detectors", post(create_event_detector))
        .route("/rest/v1/point-values", put(insert_point_values))
        .route("/rest/v1/point-values/{xid}/latest", get(latest_values))
        .route("/rest/v1/point-values/{xid}", get(values_for_period))
        .route("/echo/headers", get(echo_headers).post(echo_headers))
        .route("/flaky", get(flaky))
        .route("/text", get(|| async { "plain text body" }))
        .route("/binary", get(|| async { vec![0xAAu8, 0xBB, 0xCC] }))
        .route("/broken-json", get(|| async { "this is not json" }))
        .route("/download", get(|| async { "file contents here" }))
        .route("/upload", post(upload))
        .route("/expire-cookie", get(expire_cookie))
        .route(
            "/bad-request",
            get(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"message": "validation failed"})),
                )
            }),
        )
        .with_state(state)
}

async fn login(State(state): State<SharedState>, Json(body): Json<Value>) -> impl IntoResponse {
    state.attempts.fetch_add(1, Ordering::SeqCst);
    if state.failures_left.load(Ordering::SeqCst) > 0 {
        state.failures_left.fetch_sub(1, Ordering::SeqCst);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"message": "starting up"})),
        )
            .into_response();
    }
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let headers = [(
        header::SET_COOKIE,
        format!("{SESSION_COOKIE}=sess-001; Path=/; HttpOnly"),
    )];
    (
        headers,
        Json(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "disabled": false,
        })),
    )
        .into_response()
}

async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn current_user(headers: HeaderMap) -> impl IntoResponse {
    let authenticated = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|cookies| cookies.contains(SESSION_COOKIE))
        .unwrap_or(false);
    if authenticated {
        Json(json!({"username": "admin", "email": "admin@example.com", "disabled": false}))
            .into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"message": "not logged in"}))).into_response()
    }
}

async fn create_data_source(
    State(state): State<SharedState>,
    Json(mut body): Json<Value>,
) -> impl IntoResponse {
    body["id"] = json!(17);
    let xid = body["xid"].as_str().unwrap_or_default().to_string();
    state.data_sources.lock().insert(xid, body.clone());
    (StatusCode::CREATED, Json(body))
}

async fn get_data_source(
    State(state): State<SharedState>,
    Path(xid): Path<String>,
) -> impl IntoResponse {
    match state.data_sources.lock().get(&xid) {
        Some(ds) => Json(ds.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "not found"}))).into_response(),
    }
}

async fn update_data_source(
    State(state): State<SharedState>,
    Path(xid): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.data_sources.lock().insert(xid, body.clone());
    Json(body)
}

async fn delete_data_source(
    State(state): State<SharedState>,
    Path(xid): Path<String>,
) -> impl IntoResponse {
    match state.data_sources.lock().remove(&xid) {
        Some(ds) => Json(ds).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "not found"}))).into_response(),
    }
}

async fn copy_data_source(
    State(state): State<SharedState>,
    Path(xid): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let sources = state.data_sources.lock();
    let Some(original) = sources.get(&xid) else {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "not found"}))).into_response();
    };
    let mut copy = original.clone();
    copy["xid"] = json!(params["copyXid"]);
    copy["name"] = json!(params["copyName"]);
    copy["id"] = json!(18);
    Json(copy).into_response()
}

async fn create_event_detector(Json(mut body): Json<Value>) -> impl IntoResponse {
    body["id"] = json!(99);
    (StatusCode::CREATED, Json(body))
}

async fn insert_point_values(
    State(state): State<SharedState>,
    Json(body): Json<Vec<Value>>,
) -> StatusCode {
    state.point_values.lock().extend(body);
    StatusCode::CREATED
}

async fn latest_values(
    State(state): State<SharedState>,
    Path(xid): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    let limit: usize = params
        .get("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(100);
    let values = state.point_values.lock();
    let mut matching: Vec<Value> = values
        .iter()
        .filter(|v| v["xid"] == json!(xid))
        .cloned()
        .collect();
    matching.sort_by_key(|v| std::cmp::Reverse(v["timestamp"].as_i64().unwrap_or(0)));
    matching.truncate(limit);
    Json(matching)
}

async fn values_for_period(
    State(state): State<SharedState>,
    Path(xid): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    // Bounds arrive as ISO-8601 date-times, not epoch millis
    let parse = |key: &str| -> Option<DateTime<Utc>> {
        params.get(key)?.parse().ok()
    };
    let (Some(from), Some(to)) = (parse("from"), parse("to")) else {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "bad range"}))).into_response();
    };
    let values = state.point_values.lock();
    let matching: Vec<Value> = values
        .iter()
        .filter(|v| {
            let ts = v["timestamp"].as_i64().unwrap_or(0);
            v["xid"] == json!(xid) && ts >= from.timestamp_millis() && ts < to.timestamp_millis()
        })
        .cloned()
        .collect();
    Json(matching).into_response()
}

async fn echo_headers(headers: HeaderMap) -> Json<Value> {
    let mut echoed = serde_json::Map::new();
    for (name, value) in &headers {
        if let Ok(value) = value.to_str() {
            echoed.insert(name.as_str().to_string(), json!(value));
        }
    }
    Json(Value::Object(echoed))
}

async fn flaky(State(state): State<SharedState>) -> impl IntoResponse {
    state.attempts.fetch_add(1, Ordering::SeqCst);
    let failures = state.failures_left.load(Ordering::SeqCst);
    if failures > 0 {
        state.failures_left.fetch_sub(1, Ordering::SeqCst);
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"message": "warming up"})),
        )
            .into_response()
    } else {
        Json(json!({"ok": true})).into_response()
    }
}

async fn upload(mut multipart: Multipart) -> Json<Value> {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let contents = field.bytes().await.unwrap();
        fields.push(json!({"name": name, "content": contents.to_vec()}));
    }
    Json(json!({"fields": fields}))
}

async fn expire_cookie() -> impl IntoResponse {
    let headers = [(
        header::SET_COOKIE,
        format!("{SESSION_COOKIE}=expired; Max-Age=0; Path=/"),
    )];
    (headers, Json(json!({"ok": true})))
}

// =============================================================================
// Test Helpers
// =============================================================================

async fn create_test_server() -> (TestServer, SharedState) {
    let state = Arc::new(AppState::default());
    let router = create_router(Arc::clone(&state));
    let server = TestServer::start(router)
        .await
        .expect("Failed to start test server");
    (server, state)
}

// =============================================================================
// Session and CSRF Tests
// =============================================================================

#[tokio::test]
async fn test_login_stores_session_cookie() {
    let (server, _) = create_test_server().await;

    // Unauthenticated: no session cookie yet
    let err = server.client.users().current().await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    let user = server.client.users().login("admin", "admin").await.unwrap();
    assert_eq!(user.username, "admin");
    assert_eq!(
        server.client.with_session(|s| s.cookie(SESSION_COOKIE).map(str::to_owned)),
        Some("sess-001".to_string())
    );

    // The stored cookie authenticates the next request
    let current = server.client.users().current().await.unwrap();
    assert_eq!(current.username, "admin");
}

#[tokio::test]
async fn test_login_retries_with_custom_delay() {
    let (server, state) = create_test_server().await;
    state.failures_left.store(2, Ordering::SeqCst);

    let start = std::time::Instant::now();
    let user = server
        .client
        .users()
        .login_with_retries("admin", "admin", 3, Duration::from_millis(20))
        .await
        .unwrap();
    assert_eq!(user.username, "admin");
    assert_eq!(state.attempts.load(Ordering::SeqCst), 3);
    // Two waits at the shortened delay, well under the 5 s default
    assert!(start.elapsed() >= Duration::from_millis(40));
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_xsrf_token_double_submit() {
    let (server, _) = create_test_server().await;

    let token = server
        .client
        .with_session(|s| s.xsrf_token().map(str::to_owned))
        .unwrap();

    let response = server
        .client
        .execute(RestRequest::get("/echo/headers"))
        .await
        .unwrap();
    let headers = response.data.as_json().unwrap().clone();

    assert_eq!(headers["x-xsrf-token"], json!(token));
    let cookie = headers["cookie"].as_str().unwrap();
    assert!(cookie.contains(&format!("XSRF-TOKEN={token}")));
}

#[tokio::test]
async fn test_cookies_disabled_sends_no_token() {
    let state = Arc::new(AppState::default());
    let router = create_router(Arc::clone(&state));
    let server = TestServer::start_with_config(router, ClientConfig::builder().enable_cookies(false))
        .await
        .unwrap();

    let response = server
        .client
        .execute(RestRequest::get("/echo/headers"))
        .await
        .unwrap();
    let headers = response.data.as_json().unwrap();
    assert!(headers.get("x-xsrf-token").is_none());
    assert!(headers.get("cookie").is_none());
}

#[tokio::test]
async fn test_max_age_zero_removes_cookie() {
    let (server, _) = create_test_server().await;

    server.client.users().login("admin", "admin").await.unwrap();
    assert!(server
        .client
        .with_session(|s| s.cookie(SESSION_COOKIE).is_some()));

    server
        .client
        .execute(RestRequest::get("/expire-cookie"))
        .await
        .unwrap();
    assert!(server
        .client
        .with_session(|s| s.cookie(SESSION_COOKIE).is_none()));
}

// =============================================================================
// Header Merging Tests
// =============================================================================

#[tokio::test]
async fn test_header_precedence() {
    let state = Arc::new(AppState::default());
    let router = create_router(Arc::clone(&state));
    let config = ClientConfig::builder()
        .default_header("x-tenant", "from-config")
        .default_header("x-trace", "from-config");
    let server = TestServer::start_with_config(router, config).await.unwrap();

    // Per-request header overrides the configured default
    let response = server
        .client
        .execute(RestRequest::get("/echo/headers").header("x-trace", "per-request"))
        .await
        .unwrap();
    let headers = response.data.as_json().unwrap();
    assert_eq!(headers["x-tenant"], json!("from-config"));
    assert_eq!(headers["x-trace"], json!("per-request"));
    assert_eq!(headers["accept"], json!("application/json"));
}

#[tokio::test]
async fn test_no_body_sends_no_content_type() {
    let (server, _) = create_test_server().await;

    // A descriptor without a body must not announce one
    let response = server
        .client
        .execute(RestRequest::get("/echo/headers"))
        .await
        .unwrap();
    let headers = response.data.as_json().unwrap();
    assert!(headers.get("content-type").is_none());
    assert!(headers.get("content-length").is_none());

    // Same for verbs that could carry one
    let response = server
        .client
        .execute(RestRequest::post("/echo/headers"))
        .await
        .unwrap();
    let headers = response.data.as_json().unwrap();
    assert!(headers.get("content-type").is_none());

    // With a JSON body both headers appear
    let response = server
        .client
        .execute(RestRequest::post("/echo/headers").json(json!({"a": 1})))
        .await
        .unwrap();
    let headers = response.data.as_json().unwrap();
    assert_eq!(headers["content-type"], json!("application/json"));
    assert_eq!(headers["content-length"], json!("7"));
}

#[tokio::test]
async fn test_bearer_authentication_header() {
    let (server, _) = create_test_server().await;

    server
        .client
        .with_session(|s| s.set_bearer_authentication("tok-abc"))
        .unwrap();

    let response = server
        .client
        .execute(RestRequest::get("/echo/headers"))
        .await
        .unwrap();
    let headers = response.data.as_json().unwrap();
    assert_eq!(headers["authorization"], json!("Bearer tok-abc"));
}

// =============================================================================
// Data Source Tests
// =============================================================================

#[tokio::test]
async fn test_data_source_crud() {
    let (server, _) = create_test_server().await;

    let ds = DataSource::new().with_model_type("VIRTUAL").with_name("Pump A");
    let created = server.client.data_sources().create(&ds).await.unwrap();
    assert_eq!(created.id, Some(17));
    assert_eq!(created.name, "Pump A");

    let fetched = server.client.data_sources().get(&ds.xid).await.unwrap();
    assert_eq!(fetched.xid, ds.xid);

    let updated = server
        .client
        .data_sources()
        .update(&ds.xid, &created.clone().enabled(true))
        .await
        .unwrap();
    assert!(updated.enabled);

    let deleted = server.client.data_sources().delete(&ds.xid).await.unwrap();
    assert_eq!(deleted.xid, ds.xid);

    let err = server.client.data_sources().get(&ds.xid).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_data_source_copy() {
    let (server, _) = create_test_server().await;

    let ds = DataSource::new().with_model_type("VIRTUAL");
    server.client.data_sources().create(&ds).await.unwrap();

    let copy = server
        .client
        .data_sources()
        .copy(&ds.xid, "DS_COPY", "Copied source")
        .await
        .unwrap();
    assert_eq!(copy.xid, "DS_COPY");
    assert_eq!(copy.name, "Copied source");
    assert_eq!(copy.id, Some(18));
}

// =============================================================================
// Event Detector Tests
// =============================================================================

#[tokio::test]
async fn test_create_high_limit_detector() {
    let (server, _) = create_test_server().await;

    let detector = EventDetector::for_data_point(42, DetectorType::HighLimit);
    let created = server.client.event_detectors().create(&detector).await.unwrap();

    assert_eq!(created.id, Some(99));
    assert_eq!(created.detector_type, Some(DetectorType::HighLimit));
    assert_eq!(created.source_id, Some(42));
    assert_eq!(created.extra["limit"], json!(15));
    assert_eq!(created.extra["resetLimit"], json!(10));
}

// =============================================================================
// Point Value Tests
// =============================================================================

#[tokio::test]
async fn test_point_value_insert_and_latest() {
    let (server, _) = create_test_server().await;

    let base = Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap();
    let values: Vec<PointValue> = (0..5)
        .map(|i| {
            PointValue::numeric("DP_1", f64::from(i), base.timestamp_millis() + i64::from(i) * 1000)
        })
        .collect();
    server.client.point_values().insert(&values).await.unwrap();

    let latest = server.client.point_values().latest("DP_1", 2).await.unwrap();
    assert_eq!(latest.len(), 2);
    // Newest first
    assert_eq!(latest[0].value, json!(4.0));
    assert_eq!(latest[1].value, json!(3.0));
}

#[tokio::test]
async fn test_point_values_for_time_period() {
    let (server, _) = create_test_server().await;

    let base = Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap();
    let values: Vec<PointValue> = (0..10)
        .map(|i| {
            PointValue::numeric("DP_2", f64::from(i), base.timestamp_millis() + i64::from(i) * 60_000)
        })
        .collect();
    server.client.point_values().insert(&values).await.unwrap();

    // Half-open range: values at minutes 2, 3 and 4
    let from = base + chrono::Duration::minutes(2);
    let to = base + chrono::Duration::minutes(5);
    let in_range = server
        .client
        .point_values()
        .for_time_period("DP_2", from, to, None)
        .await
        .unwrap();
    assert_eq!(in_range.len(), 3);
    assert_eq!(in_range[0].value, json!(2.0));
}

// =============================================================================
// Retry Tests
// =============================================================================

#[tokio::test]
async fn test_retry_succeeds_after_transient_failures() {
    let (server, state) = create_test_server().await;
    state.failures_left.store(2, Ordering::SeqCst);

    let response = server
        .client
        .execute(
            RestRequest::get("/flaky")
                .retries(3)
                .retry_delay(Duration::from_millis(10)),
        )
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(state.attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retries_exhausted_reports_last_error() {
    let (server, state) = create_test_server().await;
    state.failures_left.store(100, Ordering::SeqCst);

    let err = server
        .client
        .execute(
            RestRequest::get("/flaky")
                .retries(2)
                .retry_delay(Duration::from_millis(10)),
        )
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));
    // Initial attempt plus two retries
    assert_eq!(state.attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_no_retries_by_default() {
    let (server, state) = create_test_server().await;
    state.failures_left.store(1, Ordering::SeqCst);

    let err = server
        .client
        .execute(RestRequest::get("/flaky"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(state.attempts.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Decoding and Error Tests
// =============================================================================

#[tokio::test]
async fn test_decode_text_and_bytes() {
    let (server, _) = create_test_server().await;

    let response = server
        .client
        .execute(RestRequest::get("/text").decode(DecodeMode::Text))
        .await
        .unwrap();
    assert_eq!(response.data.as_text(), Some("plain text body"));

    let response = server
        .client
        .execute(RestRequest::get("/binary").decode(DecodeMode::Bytes))
        .await
        .unwrap();
    assert_eq!(response.data.as_bytes(), Some(&[0xAAu8, 0xBB, 0xCC][..]));
}

#[tokio::test]
async fn test_json_decode_failure_is_fatal() {
    let (server, _) = create_test_server().await;

    let err = server
        .client
        .execute(RestRequest::get("/broken-json"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_http_error_carries_status_and_body() {
    let (server, _) = create_test_server().await;

    let err = server
        .client
        .execute(RestRequest::get("/bad-request"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "HTTP error - 400 Bad Request");
    assert_eq!(err.status(), Some(400));
    let data = err.data().unwrap().as_json().unwrap();
    assert_eq!(data["message"], json!("validation failed"));
}

#[tokio::test]
async fn test_empty_response_body_is_none() {
    let (server, _) = create_test_server().await;

    server.client.users().login("admin", "admin").await.unwrap();
    let response = server
        .client
        .execute(RestRequest::post("/rest/v2/logout"))
        .await
        .unwrap();
    assert_eq!(response.status, 204);
    assert!(response.data.is_none());
}

// =============================================================================
// File Transfer Tests
// =============================================================================

#[tokio::test]
async fn test_download_to_file() {
    let (server, _) = create_test_server().await;
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("download.txt");

    let response = server
        .client
        .execute(RestRequest::get("/download").write_to_file(&target))
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    assert!(response.data.is_none());

    let contents = std::fs::read_to_string(&target).unwrap();
    assert_eq!(contents, "file contents here");
}

#[tokio::test]
async fn test_multipart_upload_uses_base_filenames() {
    let (server, _) = create_test_server().await;
    let dir = tempfile::tempdir().unwrap();
    let file_a = dir.path().join("config.json");
    let file_b = dir.path().join("firmware.bin");
    let firmware: Vec<u8> = (0u8..64).collect();
    std::fs::write(&file_a, b"{}").unwrap();
    std::fs::write(&file_b, &firmware).unwrap();

    let response = server
        .client
        .execute(RestRequest::post("/upload").upload_files(vec![file_a, file_b]))
        .await
        .unwrap();
    let fields = response.data.as_json().unwrap()["fields"].clone();

    assert_eq!(fields[0]["name"], json!("config.json"));
    assert_eq!(fields[0]["content"], json!(b"{}".to_vec()));
    assert_eq!(fields[1]["name"], json!("firmware.bin"));
    assert_eq!(fields[1]["content"], json!(firmware));
}
