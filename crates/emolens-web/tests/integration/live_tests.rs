//! Tests against real services, configured through `.env`.

use std::io::Write;

use emolens_analysis::AnalysisClient;
use emolens_models::Endpoint;
use emolens_storage::BlobClient;
use tempfile::TempDir;

/// Test storage connection and bucket access.
#[tokio::test]
#[ignore = "requires storage credentials"]
async fn test_storage_connection() {
    dotenvy::dotenv().ok();

    let client = BlobClient::from_env()
        .await
        .expect("Failed to create storage client");

    client
        .check_connectivity()
        .await
        .expect("Failed to check storage connectivity");
}

/// Upload a small file under a throwaway folder.
#[tokio::test]
#[ignore = "requires storage credentials"]
async fn test_upload_small_file() {
    dotenvy::dotenv().ok();

    let client = BlobClient::from_env()
        .await
        .expect("Failed to create storage client");

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("integration check.mp4");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"integration test content").unwrap();

    let uploaded = client
        .upload_to_folder(&path, "test/integration")
        .await
        .expect("Failed to upload");

    println!("Uploaded to {}", uploaded.url);
    assert_eq!(uploaded.key.as_str(), "test/integration/integration_check.mp4");
    assert_eq!(uploaded.size_bytes, 24);
}

/// Run one analysis of a known sample video.
#[tokio::test]
#[ignore = "requires analysis service credentials and ANALYSIS_SAMPLE_MEDIA_URL"]
async fn test_analysis_roundtrip() {
    dotenvy::dotenv().ok();

    let media_url =
        std::env::var("ANALYSIS_SAMPLE_MEDIA_URL").expect("ANALYSIS_SAMPLE_MEDIA_URL not set");
    let client = AnalysisClient::from_env().expect("Failed to create analysis client");

    let response = client
        .analyze(Endpoint::CaptionOnly, &media_url)
        .await
        .expect("Analysis failed");

    println!("Run time: {} ms", response.run_time_ms);
    println!("Result keys: {:?}", response.result.extra.keys().collect::<Vec<_>>());
}
