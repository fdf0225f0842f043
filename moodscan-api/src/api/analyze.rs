//! Audio upload analysis endpoints
//!
//! Uploads arrive as multipart form data, get staged to temp files that
//! keep the original extension (the decoder probes by extension hint),
//! and run through the blocking analysis pipeline off the async runtime.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::{routing::post, Json, Router};
use serde::Serialize;
use tracing::debug;

use moodscan_dsp::{analyze_batch, analyze_file, is_supported_extension, Analysis, AnalysisOptions};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Analysis result for one uploaded file
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    /// Mood label from the decision table
    pub mood: String,
    /// Normalized energy in [0, 1]
    pub energy: f64,
    /// Tempo in BPM after half-tempo correction
    pub tempo: f64,
    /// Estimated musical key, e.g. "A minor"
    pub key: String,
    /// Human-readable description of the classification
    pub explanation: String,
    /// Decoded duration in seconds, present when `detailed` was set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Archetype similarity scores, present when `similarity_search` was set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similar_moods: Option<BTreeMap<String, f64>>,
}

/// One failed file in a batch
#[derive(Debug, Serialize)]
pub struct BatchError {
    pub filename: String,
    pub error: String,
}

/// Batch analysis response: per-file successes and failures
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<AnalyzeResponse>,
    pub errors: Vec<BatchError>,
}

/// One uploaded file pulled out of the multipart stream
struct Upload {
    filename: String,
    bytes: Bytes,
}

/// Parsed multipart form: files plus the two option flags
struct AnalyzeForm {
    files: Vec<Upload>,
    detailed: bool,
    similarity_search: bool,
}

/// POST /analyze
///
/// Analyze a single uploaded audio file.
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<AnalyzeResponse>> {
    let form = read_form(multipart).await?;

    let mut files = form.files;
    let upload = files
        .pop()
        .ok_or_else(|| ApiError::BadRequest("no file part in request".to_string()))?;
    if !files.is_empty() {
        return Err(ApiError::BadRequest(
            "expected exactly one file part".to_string(),
        ));
    }

    check_extension(&upload.filename)?;

    let opts = AnalysisOptions {
        detailed: form.detailed,
        with_similarity: form.similarity_search,
        max_seconds: state.config.max_analysis_seconds,
    };

    let staged = stage_upload(&upload)?;
    let path = staged.path().to_path_buf();
    let analysis = tokio::task::spawn_blocking(move || analyze_file(&path, &opts))
        .await
        .map_err(|e| ApiError::Internal(format!("analysis task failed: {e}")))??;

    Ok(Json(to_response(analysis, &opts)))
}

/// POST /batch-analyze
///
/// Analyze several uploaded files. Every filename is validated before
/// any analysis starts, so a single bad extension rejects the whole
/// request. Per-file decode failures land in `errors` without stopping
/// the rest of the batch.
pub async fn batch_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<BatchResponse>> {
    let form = read_form(multipart).await?;
    if form.files.is_empty() {
        return Err(ApiError::BadRequest("no file parts in request".to_string()));
    }

    for upload in &form.files {
        check_extension(&upload.filename)?;
    }

    let opts = AnalysisOptions {
        detailed: form.detailed,
        with_similarity: form.similarity_search,
        max_seconds: state.config.max_analysis_seconds,
    };

    // Staged handles stay alive until every analysis finished
    let mut staged = Vec::with_capacity(form.files.len());
    for upload in &form.files {
        staged.push(stage_upload(upload)?);
    }
    let paths: Vec<PathBuf> = staged.iter().map(|f| f.path().to_path_buf()).collect();

    let outcomes = analyze_batch(paths, opts, None).await;

    let mut results = Vec::new();
    let mut errors = Vec::new();
    for (upload, (_, outcome)) in form.files.iter().zip(outcomes) {
        match outcome {
            Ok(analysis) => results.push(to_response(analysis, &opts)),
            Err(e) => errors.push(BatchError {
                filename: upload.filename.clone(),
                error: e.to_string(),
            }),
        }
    }

    Ok(Json(BatchResponse { results, errors }))
}

/// POST /analyze-url
///
/// Placeholder for fetching and analyzing remote audio.
pub async fn analyze_url() -> ApiError {
    ApiError::Unimplemented("URL analysis is not available yet".to_string())
}

/// Build analysis routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/batch-analyze", post(batch_analyze))
        .route("/analyze-url", post(analyze_url))
}

/// Drain the multipart stream into files and flags.
///
/// Unknown part names are ignored. Any read failure (including bodies
/// over the configured limit) is the caller's problem, not ours.
async fn read_form(mut multipart: Multipart) -> ApiResult<AnalyzeForm> {
    let mut form = AnalyzeForm {
        files: Vec::new(),
        detailed: false,
        similarity_search: false,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("unreadable multipart field: {e}")))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .ok_or_else(|| {
                        ApiError::BadRequest("file part is missing a filename".to_string())
                    })?
                    .to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::BadRequest(format!("could not read upload {filename}: {e}"))
                })?;
                debug!(filename = %filename, size = bytes.len(), "received upload");
                form.files.push(Upload { filename, bytes });
            }
            Some("detailed") => {
                form.detailed = parse_bool(&read_text(field).await?);
            }
            Some("similarity_search") => {
                form.similarity_search = parse_bool(&read_text(field).await?);
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("unreadable multipart field: {e}")))
}

/// Form-style truthiness: "true", "1", "yes", "on" in any case
fn parse_bool(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

fn check_extension(filename: &str) -> ApiResult<()> {
    if !is_supported_extension(Path::new(filename)) {
        return Err(ApiError::BadRequest(format!(
            "unsupported file format: {filename}"
        )));
    }
    Ok(())
}

/// Write the upload to a temp file that keeps the original extension.
fn stage_upload(upload: &Upload) -> ApiResult<tempfile::NamedTempFile> {
    let extension = Path::new(&upload.filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin");
    let file = tempfile::Builder::new()
        .prefix("moodscan-upload-")
        .suffix(&format!(".{extension}"))
        .tempfile()?;
    std::fs::write(file.path(), &upload.bytes)?;
    Ok(file)
}

fn to_response(analysis: Analysis, opts: &AnalysisOptions) -> AnalyzeResponse {
    let result = analysis.mood_result;
    AnalyzeResponse {
        mood: result.mood.to_string(),
        energy: analysis.features.energy,
        tempo: result.corrected_tempo,
        key: result.key,
        explanation: result.explanation,
        duration: opts.detailed.then_some(analysis.duration_seconds),
        similar_moods: opts.with_similarity.then_some(result.similarity_scores),
    }
}
