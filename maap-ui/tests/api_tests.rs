//! Integration tests for maap-ui API endpoints
//!
//! Tests cover routing, the record cache, export downloads, and error
//! mapping. Endpoints are exercised offline: the configured store and
//! upload URLs point at a discard port, so upstream calls fail fast and
//! the tests assert the error/timeout behavior instead of remote payloads.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use maap_common::{AnalysisRecord, PortalConfig};
use maap_ui::{build_router, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: state with unreachable upstream endpoints
fn setup_state() -> AppState {
    setup_state_with_store("http://127.0.0.1:9/records".to_string())
}

/// Test helper: state pointed at a given store URL (uploads stay unreachable)
fn setup_state_with_store(store_url: String) -> AppState {
    let config = PortalConfig {
        store_url,
        upload_url: "http://127.0.0.1:9/upload".to_string(),
        fetch_timeout_seconds: 2,
        upload_timeout_seconds: 2,
        ..Default::default()
    };
    config.validate().expect("Test config should validate");
    AppState::new(config).expect("Should create state")
}

/// Test helper: serve a fixed body as the record store on an ephemeral port
async fn spawn_store_stub(body: &'static str) -> String {
    use axum::routing::get;
    let app = axum::Router::new().route("/records", get(move || async move { body }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Should bind stub listener");
    let addr = listener.local_addr().expect("Should read stub address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Stub server failed");
    });
    format!("http://{}/records", addr)
}

/// Test helper: seed the record cache with a few records
async fn seed_records(state: &AppState) {
    let value = json!([
        {"studentId": "S-1", "audioFile": "first.mp3", "summary": "ok"},
        {"studentId": "S-2", "audioFile": "second.mp3"}
    ]);
    let records: Vec<AnalysisRecord> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| AnalysisRecord::from_value(v).unwrap())
        .collect();
    *state.records.write().await = records;
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn extract_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Should be UTF-8")
}

// =============================================================================
// Health and UI
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_router(setup_state());

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "maap-ui");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_index_page_serves_portal_ui() {
    let app = build_router(setup_state());

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_text(response.into_body()).await;
    assert!(body.contains("Mentoring Audio Analysis Portal"));
    assert!(body.contains("/api/upload"));
}

// =============================================================================
// Record cache lookup
// =============================================================================

#[tokio::test]
async fn test_get_record_from_cache() {
    let state = setup_state();
    seed_records(&state).await;
    let app = build_router(state);

    let response = app.oneshot(get("/api/records/0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["studentId"], "S-1");
    assert_eq!(body["audioFile"], "first.mp3");
}

#[tokio::test]
async fn test_get_record_out_of_range_is_404() {
    let state = setup_state();
    seed_records(&state).await;
    let app = build_router(state);

    let response = app.oneshot(get("/api/records/5")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_list_records_malformed_body_keeps_previous_records() {
    // Store answers 200 with a non-JSON body: the handler reports the
    // previously fetched records and leaves the cache intact, so existing
    // record and export links keep working.
    let store_url = spawn_store_stub("this is not a record list").await;
    let state = setup_state_with_store(store_url);
    seed_records(&state).await;
    let app = build_router(state);

    let response = app.clone().oneshot(get("/api/records")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().map(Vec::len), Some(2), "Previous records returned");

    let response = app.oneshot(get("/api/records/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "Cache must survive a malformed poll");
}

#[tokio::test]
async fn test_list_records_with_unreachable_store_is_upstream_error() {
    let app = build_router(setup_state());

    let response = app.oneshot(get("/api/records")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
}

// =============================================================================
// Export downloads
// =============================================================================

#[tokio::test]
async fn test_export_text_download() {
    let state = setup_state();
    seed_records(&state).await;
    let app = build_router(state);

    let response = app.oneshot(get("/api/export/0/text")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let disposition = response
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("attachment"));
    assert!(disposition.contains("record_0.txt"));

    let body = extract_text(response.into_body()).await;
    assert!(body.contains("Student ID: S-1"));
    assert!(body.contains("Audio File: first.mp3"));
}

#[tokio::test]
async fn test_export_document_download() {
    let state = setup_state();
    seed_records(&state).await;
    let app = build_router(state);

    let response = app.oneshot(get("/api/export/1/document")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_text(response.into_body()).await;
    assert!(body.starts_with("Audio Analysis Report — S-2"));
    assert!(body.contains("--- Page 1 of"));
}

#[tokio::test]
async fn test_export_unknown_index_is_404() {
    let app = build_router(setup_state());

    let response = app.oneshot(get("/api/export/0/text")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Watch endpoint
// =============================================================================

#[tokio::test]
async fn test_watch_timeout_is_a_normal_200_outcome() {
    // Store is unreachable: every attempt is a soft fetch failure, so a
    // one-attempt watch reports a timeout, not an error response.
    let app = build_router(setup_state());

    let request = Request::builder()
        .method("POST")
        .uri("/api/watch")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"file_name": "clip.mp3", "max_attempts": 1, "interval_seconds": 0.01})
                .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["outcome"], "timeout");
    assert_eq!(body["attempts"], 1);
}

#[tokio::test]
async fn test_watch_found_record_matches_cache_at_reported_index() {
    // After a successful watch the shared cache holds the collection the
    // record was found in, so the reported index addresses the same record
    // through the record and export endpoints.
    let store_url = spawn_store_stub(
        r#"[{"audioFile":"clip7_final.wav","summary":"done","studentId":"S-9"}]"#,
    )
    .await;
    let app = build_router(setup_state_with_store(store_url));

    let request = Request::builder()
        .method("POST")
        .uri("/api/watch")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"file_name": "clip7", "max_attempts": 2, "interval_seconds": 0.01})
                .to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["outcome"], "found");
    assert_eq!(body["index"], 0);
    assert_eq!(body["record"]["studentId"], "S-9");

    let response = app.oneshot(get("/api/records/0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cached = extract_json(response.into_body()).await;
    assert_eq!(cached["studentId"], "S-9", "Cache and watch outcome must agree");
}

#[tokio::test]
async fn test_watch_rejects_oversized_interval() {
    // Finite but far beyond what a Duration can hold; must be a 400, not
    // a handler panic
    let app = build_router(setup_state());

    let request = Request::builder()
        .method("POST")
        .uri("/api/watch")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"file_name": "clip.mp3", "max_attempts": 1, "interval_seconds": 1e30})
                .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_watch_rejects_non_positive_interval() {
    let app = build_router(setup_state());

    let request = Request::builder()
        .method("POST")
        .uri("/api/watch")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"file_name": "clip.mp3", "interval_seconds": 0.0}).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_watch_rejects_empty_identifier() {
    let app = build_router(setup_state());

    let request = Request::builder()
        .method("POST")
        .uri("/api/watch")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"file_name": "", "max_attempts": 1, "interval_seconds": 0.01}).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Upload endpoint
// =============================================================================

#[tokio::test]
async fn test_upload_without_file_field_is_400() {
    let app = build_router(setup_state());

    let boundary = "maaptestboundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nhello\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_upload_with_unreachable_endpoint_is_upstream_error() {
    let app = build_router(setup_state());

    let boundary = "maaptestboundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"clip.mp3\"\r\n\
         Content-Type: audio/mpeg\r\n\r\nfakeaudio\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
