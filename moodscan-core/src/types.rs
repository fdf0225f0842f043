//! Core data model: feature vector input, key estimate, mood result

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Pitch-class names in semitone order starting at C (index 0).
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Spectral centroid value treated as full brightness. Centroids are
/// divided by this and capped at 1.0 to get `brightness` in [0, 1].
pub const BRIGHTNESS_FULL_SCALE_HZ: f64 = 5000.0;

/// Numeric audio descriptors for one track (sub-)segment, produced by a
/// DSP front end. Immutable once built.
///
/// The energy scale is the scaled-RMS convention (mean frame RMS x 2.5,
/// clamped to [0, 1] upstream); the classifier thresholds and the
/// similarity archetypes are calibrated against it. The classifier itself
/// never clips energy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Estimated beats per minute, always > 0
    pub tempo_bpm: f64,
    /// Strength-of-beat signal in [0, +inf); near 0 means no reliable beat
    pub tempo_confidence: f64,
    /// Normalized loudness proxy, working range roughly [0, 1]
    pub energy: f64,
    /// Raw brightness measure in Hz
    pub spectral_centroid_hz: f64,
    /// Timbral noisiness, fraction of sign changes in [0, 1]
    pub zero_crossing_rate: f64,
    /// Relative energy per pitch class, index 0 = C, ascending by semitone
    pub chroma: [f64; 12],
}

impl FeatureVector {
    /// Reject non-finite or out-of-domain values before classification.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let scalars = [
            ("tempo_bpm", self.tempo_bpm),
            ("tempo_confidence", self.tempo_confidence),
            ("energy", self.energy),
            ("spectral_centroid_hz", self.spectral_centroid_hz),
            ("zero_crossing_rate", self.zero_crossing_rate),
        ];
        for (field, value) in scalars {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite { field, value });
            }
        }
        for value in self.chroma {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite {
                    field: "chroma",
                    value,
                });
            }
        }
        if self.tempo_bpm <= 0.0 {
            return Err(ValidationError::NonPositiveTempo(self.tempo_bpm));
        }
        let non_negative = [
            ("tempo_confidence", self.tempo_confidence),
            ("spectral_centroid_hz", self.spectral_centroid_hz),
            ("zero_crossing_rate", self.zero_crossing_rate),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(ValidationError::Negative { field, value });
            }
        }
        Ok(())
    }

    /// Normalized brightness: `min(centroid / 5000, 1.0)`.
    pub fn brightness(&self) -> f64 {
        brightness(self.spectral_centroid_hz)
    }
}

/// Normalize a spectral centroid in Hz to a brightness value in [0, 1].
pub fn brightness(spectral_centroid_hz: f64) -> f64 {
    (spectral_centroid_hz / BRIGHTNESS_FULL_SCALE_HZ).min(1.0)
}

/// Musical key derived from a chroma vector. Computed once per feature
/// vector, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEstimate {
    /// Pitch-class index of the detected root, 0 = C
    pub root: usize,
    /// True when the major third above the root outweighs the minor third
    pub is_major: bool,
}

impl KeyEstimate {
    pub fn root_name(&self) -> &'static str {
        NOTE_NAMES[self.root % 12]
    }

    pub fn mode_name(&self) -> &'static str {
        if self.is_major {
            "major"
        } else {
            "minor"
        }
    }
}

impl fmt::Display for KeyEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.root_name(), self.mode_name())
    }
}

/// Closed vocabulary of mood/genre labels the decision table can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    #[serde(rename = "Ambient/Drone")]
    AmbientDrone,
    #[serde(rename = "Atmospheric/Textural")]
    AtmosphericTextural,
    #[serde(rename = "Noise/Experimental")]
    NoiseExperimental,
    #[serde(rename = "Harsh Noise/Experimental")]
    HarshNoiseExperimental,
    #[serde(rename = "Glitch/Experimental")]
    GlitchExperimental,
    #[serde(rename = "Techno/Dark")]
    TechnoDark,
    #[serde(rename = "Techno/Industrial")]
    TechnoIndustrial,
    #[serde(rename = "Energetic/Rave")]
    EnergeticRave,
    #[serde(rename = "House/Dance")]
    HouseDance,
    #[serde(rename = "Dark House")]
    DarkHouse,
    #[serde(rename = "Disco/Funk")]
    DiscoFunk,
    #[serde(rename = "Club/Groovy")]
    ClubGroovy,
    #[serde(rename = "Drum & Bass")]
    DrumAndBass,
    #[serde(rename = "Breakbeat/Fast")]
    BreakbeatFast,
    #[serde(rename = "Fast/Atmospheric")]
    FastAtmospheric,
    #[serde(rename = "Hard/Aggressive")]
    HardAggressive,
    #[serde(rename = "Driving Electronic")]
    DrivingElectronic,
    #[serde(rename = "Ambient/Atmospheric")]
    AmbientAtmospheric,
    #[serde(rename = "Melancholic/Sad")]
    MelancholicSad,
    #[serde(rename = "Downtempo/Relaxed")]
    DowntempoRelaxed,
    #[serde(rename = "Slow Burn")]
    SlowBurn,
    #[serde(rename = "Downtempo/Dark")]
    DowntempoDark,
    #[serde(rename = "Ambient/Chill")]
    AmbientChill,
    #[serde(rename = "Midtempo Groove")]
    MidtempoGroove,
    #[serde(rename = "Minimal/Sparse")]
    MinimalSparse,
    #[serde(rename = "Upbeat/Moderate")]
    UpbeatModerate,
    #[serde(rename = "Moderate Groove")]
    ModerateGroove,
    #[serde(rename = "Relaxed/Moderate")]
    RelaxedModerate,
    #[serde(rename = "Low Energy")]
    LowEnergy,
}

impl Mood {
    /// Display label, e.g. "Techno/Dark".
    pub fn name(&self) -> &'static str {
        match self {
            Mood::AmbientDrone => "Ambient/Drone",
            Mood::AtmosphericTextural => "Atmospheric/Textural",
            Mood::NoiseExperimental => "Noise/Experimental",
            Mood::HarshNoiseExperimental => "Harsh Noise/Experimental",
            Mood::GlitchExperimental => "Glitch/Experimental",
            Mood::TechnoDark => "Techno/Dark",
            Mood::TechnoIndustrial => "Techno/Industrial",
            Mood::EnergeticRave => "Energetic/Rave",
            Mood::HouseDance => "House/Dance",
            Mood::DarkHouse => "Dark House",
            Mood::DiscoFunk => "Disco/Funk",
            Mood::ClubGroovy => "Club/Groovy",
            Mood::DrumAndBass => "Drum & Bass",
            Mood::BreakbeatFast => "Breakbeat/Fast",
            Mood::FastAtmospheric => "Fast/Atmospheric",
            Mood::HardAggressive => "Hard/Aggressive",
            Mood::DrivingElectronic => "Driving Electronic",
            Mood::AmbientAtmospheric => "Ambient/Atmospheric",
            Mood::MelancholicSad => "Melancholic/Sad",
            Mood::DowntempoRelaxed => "Downtempo/Relaxed",
            Mood::SlowBurn => "Slow Burn",
            Mood::DowntempoDark => "Downtempo/Dark",
            Mood::AmbientChill => "Ambient/Chill",
            Mood::MidtempoGroove => "Midtempo Groove",
            Mood::MinimalSparse => "Minimal/Sparse",
            Mood::UpbeatModerate => "Upbeat/Moderate",
            Mood::ModerateGroove => "Moderate Groove",
            Mood::RelaxedModerate => "Relaxed/Moderate",
            Mood::LowEnergy => "Low Energy",
        }
    }

    /// Every label in the vocabulary, in decision-table order.
    pub fn all() -> &'static [Mood] {
        &[
            Mood::AmbientDrone,
            Mood::AtmosphericTextural,
            Mood::NoiseExperimental,
            Mood::HarshNoiseExperimental,
            Mood::GlitchExperimental,
            Mood::TechnoDark,
            Mood::TechnoIndustrial,
            Mood::EnergeticRave,
            Mood::HouseDance,
            Mood::DarkHouse,
            Mood::DiscoFunk,
            Mood::ClubGroovy,
            Mood::DrumAndBass,
            Mood::BreakbeatFast,
            Mood::FastAtmospheric,
            Mood::HardAggressive,
            Mood::DrivingElectronic,
            Mood::AmbientAtmospheric,
            Mood::MelancholicSad,
            Mood::DowntempoRelaxed,
            Mood::SlowBurn,
            Mood::DowntempoDark,
            Mood::AmbientChill,
            Mood::MidtempoGroove,
            Mood::MinimalSparse,
            Mood::UpbeatModerate,
            Mood::ModerateGroove,
            Mood::RelaxedModerate,
            Mood::LowEnergy,
        ]
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::all()
            .iter()
            .find(|m| m.name() == s)
            .copied()
            .ok_or_else(|| format!("unknown mood label: {s}"))
    }
}

/// Classification output for one feature vector. Immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodResult {
    /// Label from the closed vocabulary
    pub mood: Mood,
    /// Tempo after half-tempo repair; all downstream logic uses this
    pub corrected_tempo: f64,
    /// Rendered key, e.g. "A minor"
    pub key: String,
    /// Archetype name -> similarity in [0, 1], two decimal places
    pub similarity_scores: BTreeMap<String, f64>,
    /// Human-readable description of the signal
    pub explanation: String,
}
