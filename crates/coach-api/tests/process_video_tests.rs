//! End-to-end tests for the process-video flow.
//!
//! These drive the router directly; the Gemini side runs in mock mode or
//! against a local wiremock server, so no real credentials are needed.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use coach_api::{create_router, ApiConfig, AppState};
use coach_gemini::{GeminiClient, GeminiConfig};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOUNDARY: &str = "coach-test-boundary";

fn mock_state(upload_dir: &std::path::Path) -> AppState {
    state_with_gemini(
        upload_dir,
        GeminiConfig {
            api_key: None,
            ..Default::default()
        },
    )
}

fn state_with_gemini(upload_dir: &std::path::Path, gemini: GeminiConfig) -> AppState {
    AppState {
        config: ApiConfig {
            upload_dir: upload_dir.to_path_buf(),
            ..Default::default()
        },
        analyzer: Arc::new(GeminiClient::new(gemini)),
        pose: None,
    }
}

/// Hand-rolled multipart body with a single file field.
fn multipart_body(field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: video/mp4\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn process_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process-video")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_root_banner() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(mock_state(dir.path()), None);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["message"], "AI Coach Backend is running");
}

#[tokio::test]
async fn test_process_video_mock_mode() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(mock_state(dir.path()), None);

    // Garbage bytes: the analysis path is mocked and the tracking path
    // degrades to empty on an unreadable container
    let body = multipart_body("file", "clip.mp4", b"definitely not a video");
    let response = app.oneshot(process_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;

    let shots = body["analysis"]["shots"].as_array().unwrap();
    assert_eq!(shots.len(), 1);
    assert_eq!(shots[0]["result"], "missed");
    assert_eq!(shots[0]["feedback"], "Mock feedback: Check API key.");

    assert_eq!(body["tracking"].as_array().unwrap().len(), 0);
    assert_eq!(body["metadata"]["fps"], json!(0.0));

    // Cleanup invariant: nothing left in the upload directory
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_process_video_missing_file_field() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(mock_state(dir.path()), None);

    let body = multipart_body("not_file", "clip.mp4", b"bytes");
    let response = app.oneshot(process_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("file"));
}

#[tokio::test]
async fn test_process_video_remote_failure_returns_500() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file": {
                "name": "files/doomed",
                "uri": "https://generativelanguage.googleapis.com/v1beta/files/doomed",
                "state": "FAILED",
            }
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let gemini = GeminiConfig {
        api_key: Some("test-key".to_string()),
        base_url: server.uri(),
        poll_initial_interval: Duration::from_millis(10),
        poll_budget: Duration::from_millis(100),
        ..Default::default()
    };
    let app = create_router(state_with_gemini(dir.path(), gemini), None);

    let body = multipart_body("file", "clip.mp4", b"bytes");
    let response = app.oneshot(process_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("Video processing failed"));

    // Cleanup holds on the failure path too
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(mock_state(dir.path()), None);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "healthy");
}
