//! moodscan-core - Rule-based mood/genre decision core
//!
//! Turns a fixed set of numeric audio descriptors (tempo, tempo confidence,
//! energy, spectral centroid, zero-crossing rate, 12-bin chroma) into a
//! mood label, a corrected tempo, a musical key, similarity scores against
//! reference genre archetypes, and a human-readable explanation.
//!
//! The core is a pure function: no I/O, no hidden state, no randomness.
//! Identical inputs always produce identical results. Callers are expected
//! to validate feature vectors at the boundary (`FeatureVector::validate`)
//! before classification; the engine itself is total over finite inputs.

pub mod engine;
pub mod error;
pub mod explain;
pub mod key;
pub mod similarity;
pub mod types;

pub use crate::engine::classify;
pub use crate::error::ValidationError;
pub use crate::key::estimate_key;
pub use crate::types::{FeatureVector, KeyEstimate, Mood, MoodResult, NOTE_NAMES};
