//! Workflow runs against mock storage and analysis services.

use emolens_models::Endpoint;
use emolens_web::render::{Preview, PLACEHOLDER};
use emolens_web::workflow::Stage;
use emolens_web::{NoticeLevel, StagedUpload, Workflow, WorkflowOutcome};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use super::{TestEnv, BUCKET};

const VIDEO: &[u8] = b"\x00\x00\x00\x18ftypmp42 fake video payload";

async fn mount_upload_ok(env: &TestEnv) {
    Mock::given(method("PUT"))
        .and(path(format!("/{BUCKET}/videos/my_clip.mp4")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&env.storage)
        .await;
}

async fn run(env: &TestEnv, endpoint: Endpoint) -> WorkflowOutcome {
    let staged = StagedUpload::create(env.temp_root.path(), "my clip.mp4")
        .await
        .unwrap();
    tokio::fs::write(staged.path(), VIDEO).await.unwrap();

    Workflow::from_state(&env.state).run(staged, endpoint).await
}

fn messages(outcome: &WorkflowOutcome) -> Vec<&str> {
    outcome.notices.iter().map(|n| n.message.as_str()).collect()
}

#[tokio::test]
async fn test_full_run_embeds_visualization() {
    let env = TestEnv::start().await;
    mount_upload_ok(&env).await;

    let media_url = env.object_url("videos/my_clip.mp4");
    let html_url = format!("{}/out/combined.html", env.analysis.uri());

    Mock::given(method("POST"))
        .and(path("/face-model"))
        .and(header("authorization", "test-api-key"))
        .and(body_json(json!({ "media_url": media_url })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "result_video_path": "https://out.example.com/annotated.mp4",
                "combined_html_path": html_url,
                "emotion_csv_path": "https://out.example.com/emotions.csv"
            },
            "run_time_ms": 10000
        })))
        .expect(1)
        .mount(&env.analysis)
        .await;
    Mock::given(method("GET"))
        .and(path("/out/combined.html"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<h1>Timeline</h1>", "text/html"))
        .expect(1)
        .mount(&env.analysis)
        .await;

    let outcome = run(&env, Endpoint::FaceModel).await;

    assert!(outcome.succeeded());
    assert_eq!(outcome.stage, Stage::Render);
    assert_eq!(
        messages(&outcome),
        [
            "Selected file: my_clip.mp4",
            "Uploading file...",
            format!("File successfully uploaded to videos! Object URL: {media_url}").as_str(),
            "Running analysis with face+model...",
            "Analysis completed.",
        ]
    );
    assert_eq!(outcome.notices[2].link.as_deref(), Some(media_url.as_str()));

    let view = outcome.result.unwrap();
    assert_eq!(view.elapsed_display, "25.00");
    assert_eq!(view.cost_display, "0.02");
    assert_eq!(view.preview, Preview::Embedded("<h1>Timeline</h1>".to_string()));
    assert_eq!(view.fields.len(), 1);
    assert_eq!(view.fields[0].label, "Emotion Csv Path");

    // The store received exactly the submitted bytes.
    let puts = env.storage.received_requests().await.unwrap();
    assert_eq!(puts[0].body, VIDEO.to_vec());

    assert!(env.temp_root_is_empty());
}

#[tokio::test]
async fn test_upload_failure_halts_before_analysis() {
    let env = TestEnv::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&env.storage)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&env.analysis)
        .await;

    let outcome = run(&env, Endpoint::FaceCaption).await;

    assert!(!outcome.succeeded());
    assert_eq!(outcome.stage, Stage::Upload);
    let last = outcome.notices.last().unwrap();
    assert_eq!(last.level, NoticeLevel::Error);
    assert_eq!(last.message, "Failed to upload file.");
    assert!(env.temp_root_is_empty());
}

#[tokio::test]
async fn test_analysis_error_status_halts() {
    let env = TestEnv::start().await;
    mount_upload_ok(&env).await;
    Mock::given(method("POST"))
        .and(path("/caption-only"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&env.analysis)
        .await;

    let outcome = run(&env, Endpoint::CaptionOnly).await;

    assert_eq!(outcome.stage, Stage::Analyze);
    assert!(outcome.result.is_none());
    let last = outcome.notices.last().unwrap();
    assert_eq!(last.level, NoticeLevel::Error);
    assert!(last.message.starts_with("Analysis request failed: "), "{}", last.message);
    assert!(last.message.contains("model crashed"));
    assert!(env.temp_root_is_empty());
}

#[tokio::test]
async fn test_missing_result_is_unexpected_response() {
    let env = TestEnv::start().await;
    mount_upload_ok(&env).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "queued" })))
        .mount(&env.analysis)
        .await;

    let outcome = run(&env, Endpoint::FaceCaption).await;

    assert_eq!(outcome.stage, Stage::Analyze);
    let last = outcome.notices.last().unwrap();
    assert!(
        last.message.starts_with("Unexpected response from analysis service: "),
        "{}",
        last.message
    );
}

#[tokio::test]
async fn test_absent_visualization_is_not_fetched() {
    let env = TestEnv::start().await;
    mount_upload_ok(&env).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": { "result_video_path": "https://out.example.com/annotated.mp4" }
        })))
        .mount(&env.analysis)
        .await;

    let outcome = run(&env, Endpoint::FaceCaption).await;

    let view = outcome.result.unwrap();
    assert_eq!(view.preview, Preview::Absent);
    assert_eq!(view.combined_html.text, PLACEHOLDER);
    assert_eq!(view.elapsed_display, "15.00");

    let requests = env.analysis.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.method.as_str() == "POST"));
}

#[tokio::test]
async fn test_visualization_fetch_failure_is_warning_only() {
    let env = TestEnv::start().await;
    mount_upload_ok(&env).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "result_video_path": "https://out.example.com/annotated.mp4",
                "combined_html_path": format!("{}/out/gone.html", env.analysis.uri())
            },
            "run_time_ms": 2000
        })))
        .mount(&env.analysis)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&env.analysis)
        .await;

    let outcome = run(&env, Endpoint::FaceCaption).await;

    assert!(outcome.succeeded());
    let last = outcome.notices.last().unwrap();
    assert_eq!(last.level, NoticeLevel::Warning);
    assert!(last.message.starts_with("Could not load combined visualization: "));

    let view = outcome.result.unwrap();
    assert_eq!(view.preview, Preview::Unavailable);
    assert_eq!(
        view.result_video.href.as_deref(),
        Some("https://out.example.com/annotated.mp4")
    );
    assert!(env.temp_root_is_empty());
}
