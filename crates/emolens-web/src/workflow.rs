//! Upload, analyze and render one submission.
//!
//! Stages run strictly in order. A failed upload or analysis halts the
//! workflow; a failed visualization fetch only adds a warning.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use emolens_analysis::{AnalysisClient, ServiceError};
use emolens_models::{Endpoint, ObjectKey};
use emolens_storage::BlobClient;
use serde::Serialize;
use tempfile::TempDir;
use tokio::fs::File;
use tracing::{info, warn};

use crate::metrics;
use crate::render::{Preview, ResultView};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

/// A user-visible status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            link: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// Where a workflow stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Upload,
    Analyze,
    Render,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Upload => "upload",
            Stage::Analyze => "analyze",
            Stage::Render => "render",
        }
    }
}

/// A submitted file written to its own temporary directory.
///
/// The directory and everything in it is removed on drop.
#[derive(Debug)]
pub struct StagedUpload {
    dir: TempDir,
    path: PathBuf,
}

impl StagedUpload {
    /// Create a fresh directory under `temp_root` for `file_name`.
    ///
    /// Only the base name of `file_name` is used, after sanitizing.
    pub async fn create(temp_root: &Path, file_name: &str) -> io::Result<Self> {
        let key = ObjectKey::new("", file_name).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "no usable file name")
        })?;

        tokio::fs::create_dir_all(temp_root).await?;
        let dir = tempfile::Builder::new()
            .prefix("upload-")
            .tempdir_in(temp_root)?;
        let path = dir.path().join(key.file_name());

        Ok(Self { dir, path })
    }

    /// Open the staged file for writing, truncating it.
    pub async fn open(&self) -> io::Result<File> {
        File::create(&self.path).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Result of one workflow run.
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub notices: Vec<Notice>,
    pub result: Option<ResultView>,
    /// Stage the run ended in
    pub stage: Stage,
}

impl WorkflowOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_some()
    }
}

/// The clients and settings one run needs.
pub struct Workflow<'a> {
    pub storage: &'a BlobClient,
    pub analysis: &'a AnalysisClient,
    pub folder: &'a str,
}

impl<'a> Workflow<'a> {
    pub fn from_state(state: &'a AppState) -> Self {
        Self {
            storage: &state.storage,
            analysis: &state.analysis,
            folder: &state.config.upload.folder,
        }
    }

    /// Run upload, analysis and rendering for a staged file.
    ///
    /// Consumes `staged`; its temporary directory is gone when this returns.
    pub async fn run(&self, staged: StagedUpload, endpoint: Endpoint) -> WorkflowOutcome {
        let mut notices = vec![
            Notice::info(format!("Selected file: {}", staged.file_name())),
            Notice::info("Uploading file..."),
        ];

        let upload_start = Instant::now();
        let media_url = match self.storage.upload_to_folder(staged.path(), self.folder).await {
            Ok(uploaded) => {
                metrics::record_upload(uploaded.size_bytes, upload_start.elapsed().as_secs_f64());
                info!(key = %uploaded.key, "Uploaded submission");
                notices.push(
                    Notice::success(format!(
                        "File successfully uploaded to {}! Object URL: {}",
                        self.folder, uploaded.url
                    ))
                    .with_link(uploaded.url.clone()),
                );
                uploaded.url
            }
            Err(e) => {
                warn!(error = %e, "Upload failed");
                notices.push(Notice::error("Failed to upload file."));
                return finish(notices, None, Stage::Upload);
            }
        };

        // The local copy is no longer needed once the store has it.
        drop(staged);

        notices.push(Notice::info(format!(
            "Running analysis with {}...",
            endpoint.label()
        )));

        let analysis_start = Instant::now();
        let outcome = self.analysis.analyze(endpoint, &media_url).await;
        metrics::record_analysis_duration(endpoint.as_slug(), analysis_start.elapsed().as_secs_f64());

        let response = match outcome {
            Ok(response) => {
                notices.push(Notice::success("Analysis completed."));
                response
            }
            Err(e) => {
                warn!(endpoint = %endpoint, kind = e.kind(), error = %e, "Analysis failed");
                notices.push(Notice::error(analysis_failure_message(&e)));
                return finish(notices, None, Stage::Analyze);
            }
        };

        let preview = match response.result.combined_html_path.as_deref() {
            None => Preview::Absent,
            Some(url) => match self.analysis.fetch_html(url).await {
                Ok(html) => Preview::Embedded(html),
                Err(e) => {
                    warn!(error = %e, "Combined visualization fetch failed");
                    notices.push(Notice::warning(format!(
                        "Could not load combined visualization: {e}"
                    )));
                    Preview::Unavailable
                }
            },
        };

        let view = ResultView::new(&response, preview);
        finish(notices, Some(view), Stage::Render)
    }
}

fn analysis_failure_message(error: &ServiceError) -> String {
    if error.is_unexpected_shape() {
        format!("Unexpected response from analysis service: {error}")
    } else {
        format!("Analysis request failed: {error}")
    }
}

fn finish(notices: Vec<Notice>, result: Option<ResultView>, stage: Stage) -> WorkflowOutcome {
    let outcome = if result.is_some() { "success" } else { "failure" };
    metrics::record_workflow_outcome(stage.as_str(), outcome);
    WorkflowOutcome {
        notices,
        result,
        stage,
    }
}
