//! Form submission handler.

use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Html;
use emolens_models::{is_allowed_video, Endpoint};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::handlers::page::render_page;
use crate::state::AppState;
use crate::workflow::{Notice, StagedUpload, Workflow};

/// Shown when the submission carries no acceptable video.
pub const MISSING_VIDEO_NOTICE: &str = "Please upload a video file (.mp4 or .avi).";

/// Run the workflow for one submitted video and render the outcome.
///
/// Multipart fields: `file` (the video) and `endpoint` (a slug, defaults
/// to the first endpoint).
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Html<String>)> {
    let mut multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let mut staged: Option<StagedUpload> = None;
    let mut endpoint_raw: Option<String> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                if file_name.trim().is_empty() || !is_allowed_video(&file_name) {
                    debug!(file_name = %file_name, "Rejected submitted file");
                    continue;
                }
                let upload = StagedUpload::create(&state.config.upload.temp_dir, &file_name).await?;
                write_field(&mut field, &upload).await?;
                staged = Some(upload);
            }
            "endpoint" => endpoint_raw = Some(field.text().await.map_err(malformed)?),
            _ => debug!(field = %name, "Ignoring unknown form field"),
        }
    }

    let endpoint = match endpoint_raw.as_deref().map(str::trim) {
        None | Some("") => Endpoint::default(),
        Some(raw) => raw
            .parse::<Endpoint>()
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
    };

    let Some(staged) = staged else {
        let page = render_page(endpoint, &[Notice::info(MISSING_VIDEO_NOTICE)], None)?;
        return Ok((StatusCode::BAD_REQUEST, page));
    };

    info!(endpoint = %endpoint, file_name = %staged.file_name(), "Starting analysis workflow");
    let outcome = Workflow::from_state(&state).run(staged, endpoint).await;

    let page = render_page(endpoint, &outcome.notices, outcome.result.as_ref())?;
    Ok((StatusCode::OK, page))
}

/// Stream a multipart field into the staged file.
async fn write_field(field: &mut Field<'_>, staged: &StagedUpload) -> ApiResult<()> {
    let mut file = staged.open().await?;
    while let Some(chunk) = field.chunk().await.map_err(malformed)? {
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    Ok(())
}

fn malformed(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::bad_request(format!("Invalid multipart body: {}", e.body_text()))
    }
}
