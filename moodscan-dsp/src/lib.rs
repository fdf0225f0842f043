//! moodscan-dsp - Audio decoding and feature extraction
//!
//! Bridges audio files and the pure decision core: decodes any
//! symphonia-supported format to mono PCM, resamples to the fixed
//! analysis rate, extracts the numeric descriptors the classifier
//! consumes (tempo, beat confidence, energy, spectral centroid,
//! zero-crossing rate, chroma), and orchestrates single-file and batch
//! analysis.
//!
//! The feature scales here are paired with the classifier thresholds in
//! moodscan-core; in particular energy is mean frame RMS scaled by 2.5
//! and clamped to [0, 1]. Swapping either side independently will
//! mis-classify every track.

pub mod analyzer;
pub mod decoder;
pub mod error;
pub mod extractor;
pub mod validate;

pub use crate::analyzer::{analyze_batch, analyze_file, Analysis, AnalysisOptions};
pub use crate::decoder::{decode_audio, DecodedAudio, ANALYSIS_SAMPLE_RATE};
pub use crate::error::{AnalysisError, Result};
pub use crate::extractor::{extract_features, ExtractedFeatures};
pub use crate::validate::{is_supported_extension, validate_audio_file, SUPPORTED_EXTENSIONS};
