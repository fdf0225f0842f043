//! End-to-end analysis orchestration
//!
//! One file runs validate, decode, resample, extract, classify. Batches
//! run that pipeline per file on blocking worker threads with bounded
//! parallelism, preserving input order and isolating failures to their
//! own slot.

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use moodscan_core::{FeatureVector, MoodResult};

use crate::decoder::{decode_audio, resample_to_analysis_rate, DEFAULT_ANALYSIS_SECONDS};
use crate::error::{AnalysisError, Result};
use crate::extractor::extract_features;
use crate::validate::validate_audio_file;

/// Knobs for one analysis run.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    /// Append the decoded duration to the explanation
    pub detailed: bool,
    /// Renderers include archetype similarity scores when set
    pub with_similarity: bool,
    /// Analysis window cap in seconds
    pub max_seconds: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            detailed: false,
            with_similarity: false,
            max_seconds: DEFAULT_ANALYSIS_SECONDS,
        }
    }
}

/// Everything known about one analyzed file.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub path: PathBuf,
    pub mood_result: MoodResult,
    pub features: FeatureVector,
    pub duration_seconds: f64,
}

/// Analyze one audio file into a mood result.
///
/// Blocking: decoding and FFT work run inline. Async callers should wrap
/// this in `spawn_blocking`, which is what [`analyze_batch`] does.
pub fn analyze_file(path: &Path, opts: &AnalysisOptions) -> Result<Analysis> {
    validate_audio_file(path)?;

    let decoded = decode_audio(path, opts.max_seconds)?;
    let audio = resample_to_analysis_rate(decoded)?;
    let extracted = extract_features(&audio);

    extracted.features.validate()?;

    let key = moodscan_core::estimate_key(&extracted.features.chroma);
    let mut mood_result = moodscan_core::classify(&extracted.features, &key);

    if opts.detailed {
        mood_result.explanation = format!(
            "{}. Duration: {:.2} seconds",
            mood_result.explanation, extracted.duration_seconds
        );
    }

    tracing::info!(
        path = %path.display(),
        mood = mood_result.mood.name(),
        tempo = format!("{:.1}", mood_result.corrected_tempo),
        key = %mood_result.key,
        "analysis complete"
    );

    Ok(Analysis {
        path: path.to_path_buf(),
        mood_result,
        features: extracted.features,
        duration_seconds: extracted.duration_seconds,
    })
}

/// Analyze many files with bounded parallelism, preserving input order.
///
/// Files run on blocking worker threads, at most `workers` at a time
/// (available cores when `None`). A failed file is logged and surfaces
/// as the `Err` in its slot; the rest of the batch proceeds.
pub async fn analyze_batch(
    paths: Vec<PathBuf>,
    opts: AnalysisOptions,
    workers: Option<usize>,
) -> Vec<(PathBuf, Result<Analysis>)> {
    let workers = workers
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
        .max(1);

    tracing::debug!(files = paths.len(), workers, "starting batch analysis");

    stream::iter(paths)
        .map(|path| async move {
            let task_path = path.clone();
            let result =
                tokio::task::spawn_blocking(move || analyze_file(&task_path, &opts))
                    .await
                    .unwrap_or_else(|e| {
                        Err(AnalysisError::Internal(format!("analysis task failed: {e}")))
                    });
            if let Err(error) = &result {
                tracing::warn!(path = %path.display(), %error, "analysis failed");
            }
            (path, result)
        })
        .buffered(workers)
        .collect()
        .await
}
