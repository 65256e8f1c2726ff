//! Router tests through `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use emolens_web::create_router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use super::{TestEnv, BUCKET};

const BOUNDARY: &str = "emolens-test-boundary";

fn router(env: &TestEnv) -> Router {
    create_router(env.state.clone(), None)
}

/// Hand-built `multipart/form-data` body.
fn multipart(file: Option<(&str, &[u8])>, endpoint: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(endpoint) = endpoint {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"endpoint\"\r\n\r\n{endpoint}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn submit(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_index_renders_form() {
    let env = TestEnv::start().await;
    let response = router(&env)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"accept=".mp4,.avi""#));
    assert!(html.contains(r#"value="face-caption" selected"#));
    assert!(html.contains(r#"value="face-model""#));
    assert!(html.contains(r#"value="caption-only""#));
    assert!(!html.contains("id=\"results\""));
}

#[tokio::test]
async fn test_rejects_disallowed_extension() {
    let env = TestEnv::start().await;
    let response = router(&env)
        .oneshot(submit(multipart(Some(("notes.txt", b"hello")), None)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response)
        .await
        .contains("Please upload a video file (.mp4 or .avi)."));
    assert!(env.temp_root_is_empty());
    assert!(env.storage.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rejects_missing_file() {
    let env = TestEnv::start().await;
    let response = router(&env)
        .oneshot(submit(multipart(None, Some("face-caption"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response)
        .await
        .contains("Please upload a video file (.mp4 or .avi)."));
}

#[tokio::test]
async fn test_rejects_unknown_endpoint() {
    let env = TestEnv::start().await;
    let response = router(&env)
        .oneshot(submit(multipart(Some(("clip.mp4", b"data")), Some("audio-only"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(body["detail"].as_str().unwrap().contains("audio-only"));
    assert!(env.temp_root_is_empty());
}

#[tokio::test]
async fn test_rejects_non_multipart_body() {
    let env = TestEnv::start().await;
    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = router(&env).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_submission_renders_results() {
    let env = TestEnv::start().await;
    let media_url = env.object_url("videos/my_clip.mp4");

    Mock::given(method("PUT"))
        .and(path(format!("/{BUCKET}/videos/my_clip.mp4")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&env.storage)
        .await;
    Mock::given(method("POST"))
        .and(path("/caption-only"))
        .and(body_json(json!({ "media_url": media_url })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "result_video_path": "https://out.example.com/annotated.mp4",
                "dominant_emotion": "<joy>"
            },
            "run_time_ms": 10000
        })))
        .expect(1)
        .mount(&env.analysis)
        .await;

    let response = router(&env)
        .oneshot(submit(multipart(
            Some(("my clip.mp4", b"video bytes")),
            Some("caption-only"),
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("File successfully uploaded to videos!"));
    assert!(html.contains("Running analysis with caption-only..."));
    assert!(html.contains("Analysis completed."));
    assert!(html.contains("annotated.mp4</a>"));
    assert!(html.contains("25.00"));
    assert!(html.contains("0.02"));
    assert!(html.contains("Dominant Emotion"));
    // Result values are escaped
    assert!(html.contains("&lt;joy&gt;"));
    assert!(html.contains("Not available"));
    assert!(html.contains(r#"value="caption-only" selected"#));

    let puts = env.storage.received_requests().await.unwrap();
    assert_eq!(puts[0].body, b"video bytes".to_vec());
    assert!(env.temp_root_is_empty());
}

#[tokio::test]
async fn test_health_and_headers() {
    let env = TestEnv::start().await;
    let response = router(&env)
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("X-Request-ID", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["X-Request-ID"], "req-42");
    assert_eq!(headers["X-Content-Type-Options"], "nosniff");

    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_ready_reports_storage() {
    let env = TestEnv::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&env.storage)
        .await;

    let response = router(&env)
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["checks"]["storage"]["status"], "ok");
}

#[tokio::test]
async fn test_ready_degraded_when_storage_down() {
    let env = TestEnv::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&env.storage)
        .await;

    let response = router(&env)
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn test_metrics_route_absent_when_disabled() {
    let env = TestEnv::start().await;
    let response = router(&env)
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_page_load_touches_no_backend() {
    let env = TestEnv::start().await;
    let response = router(&env)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert!(env.storage.received_requests().await.unwrap().is_empty());
    assert!(env.analysis.received_requests().await.unwrap().is_empty());
}
