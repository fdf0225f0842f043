//! Pre-decode validation of candidate audio files
//!
//! Cheap checks run before any decoding work: the file must exist, carry
//! a supported extension, and not sniff as some known non-audio type.
//! Content sniffing is advisory; unknown bytes fall through to the
//! decoder, which is the authoritative check.

use std::path::Path;

use crate::error::{AnalysisError, Result};

/// Extensions accepted for analysis, lowercase.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "ogg", "m4a", "aac"];

/// Check a path's extension against [`SUPPORTED_EXTENSIONS`], case
/// insensitive.
pub fn is_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let lower = ext.to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

/// Validate that a path plausibly points at decodable audio.
///
/// Errors: [`AnalysisError::FileNotFound`] when the path does not exist,
/// [`AnalysisError::UnsupportedFormat`] for extensions outside the
/// whitelist, [`AnalysisError::InvalidAudio`] when the leading bytes
/// identify a known non-audio format (an image renamed to `.mp3` fails
/// here instead of deep in the decoder).
pub fn validate_audio_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(AnalysisError::FileNotFound(path.to_path_buf()));
    }

    if !is_supported_extension(path) {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("<none>");
        return Err(AnalysisError::UnsupportedFormat(ext.to_string()));
    }

    // Sniff leading bytes. Audio and video matches pass (m4a shares the
    // MP4 container with video brands); anything else recognizable is a
    // masquerading file. Unrecognized content is left for the decoder.
    if let Some(kind) = infer::get_from_path(path)? {
        match kind.matcher_type() {
            infer::MatcherType::Audio | infer::MatcherType::Video => {}
            _ => {
                tracing::warn!(
                    path = %path.display(),
                    mime = kind.mime_type(),
                    "file content does not look like audio"
                );
                return Err(AnalysisError::InvalidAudio(format!(
                    "content identifies as {}, not audio",
                    kind.mime_type()
                )));
            }
        }
    }

    Ok(())
}
