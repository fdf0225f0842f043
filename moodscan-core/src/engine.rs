//! Mood decision engine
//!
//! A prioritized rule table over corrected tempo, energy, brightness,
//! zero-crossing rate, beat confidence, and mode. Rows are evaluated top
//! to bottom and the first match wins, so a row's predicate only states
//! what the rows above it have not already consumed. The order is
//! normative: several tempo bands overlap (120-130 BPM belongs to both
//! the techno and club bands) and the degenerate-signal rows shadow every
//! genre row below them.

use crate::explain;
use crate::similarity;
use crate::types::{FeatureVector, KeyEstimate, Mood, MoodResult};

/// Every numeric threshold the decision table reads, grouped by rule band.
pub mod thresholds {
    // Half-tempo repair: fast electronic tracks are frequently
    // beat-tracked at half their true tempo
    pub const HALF_TEMPO_MIN_BPM: f64 = 80.0;
    pub const HALF_TEMPO_MAX_BPM: f64 = 145.0;
    pub const HALF_TEMPO_MIN_ENERGY: f64 = 0.8;

    // Degenerate signals: no reliable beat
    pub const MIN_BEAT_CONFIDENCE: f64 = 0.2;
    pub const DRONE_MAX_ENERGY: f64 = 0.15;
    pub const TEXTURAL_MAX_ENERGY: f64 = 0.50;
    pub const NOISE_MAX_ENERGY: f64 = 0.70;
    pub const TEXTURAL_MAX_BRIGHTNESS: f64 = 0.3;

    // Degenerate signals: noisy timbre
    pub const NOISY_ZCR: f64 = 0.25;
    pub const HARSH_NOISE_MIN_ENERGY: f64 = 0.3;

    // Techno band
    pub const TECHNO_MIN_BPM: f64 = 120.0;
    pub const TECHNO_MAX_BPM: f64 = 145.0;
    pub const TECHNO_MIN_ENERGY: f64 = 0.50;
    pub const TECHNO_DARK_MAX_BRIGHTNESS: f64 = 0.4;

    // Club/house band
    pub const CLUB_MIN_BPM: f64 = 100.0;
    pub const CLUB_MAX_BPM: f64 = 130.0;
    pub const CLUB_MIN_ENERGY: f64 = 0.15;
    pub const CLUB_RAVE_MIN_ENERGY: f64 = 0.7;
    pub const CLUB_TECHNO_MIN_BPM: f64 = 115.0;
    pub const DISCO_MAX_BPM: f64 = 115.0;
    pub const DISCO_MAX_ENERGY: f64 = 0.5;
    pub const HOUSE_MIN_BRIGHTNESS: f64 = 0.5;
    pub const DISCO_MIN_BRIGHTNESS: f64 = 0.4;

    // Drum & bass band
    pub const DNB_MIN_BPM: f64 = 148.0;
    pub const DNB_MAX_BPM: f64 = 180.0;
    pub const DNB_MIN_ENERGY: f64 = 0.4;
    pub const BREAKBEAT_MIN_ENERGY: f64 = 0.25;

    // High-energy band
    pub const HIGH_TEMPO_BPM: f64 = 180.0;
    pub const HIGH_ENERGY: f64 = 0.7;
    pub const AGGRESSIVE_MIN_ENERGY: f64 = 0.8;
    pub const RAVE_MIN_ENERGY: f64 = 0.6;

    // Low-energy band
    pub const LOW_ENERGY_MAX: f64 = 0.2;
    pub const SLOW_MAX_BPM: f64 = 70.0;
    pub const AMBIENT_MAX_ENERGY: f64 = 0.08;
    pub const RELAXED_MAX_ENERGY: f64 = 0.15;
    pub const MIDTEMPO_MAX_BPM: f64 = 100.0;
    pub const DOWNTEMPO_DARK_MAX_BRIGHTNESS: f64 = 0.35;
    pub const CHILL_MAX_ENERGY: f64 = 0.12;
    pub const MINIMAL_MIN_ENERGY: f64 = 0.08;

    // Fallback band
    pub const MODERATE_MIN_ENERGY: f64 = 0.25;
    pub const UPBEAT_MIN_BPM: f64 = 100.0;
    pub const FALLBACK_RELAXED_MIN_ENERGY: f64 = 0.15;
}

use thresholds::*;

/// Classification context built once per call: corrected tempo plus the
/// normalized measures the rules read.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Signal {
    /// Tempo after half-tempo repair
    pub tempo: f64,
    pub energy: f64,
    /// Normalized spectral centroid in [0, 1]
    pub brightness: f64,
    pub zero_crossing_rate: f64,
    pub beat_confidence: f64,
    pub is_major: bool,
}

impl Signal {
    fn no_beat(&self) -> bool {
        self.beat_confidence < MIN_BEAT_CONFIDENCE
    }

    fn noisy(&self) -> bool {
        self.zero_crossing_rate > NOISY_ZCR
    }

    fn techno_band(&self) -> bool {
        (TECHNO_MIN_BPM..=TECHNO_MAX_BPM).contains(&self.tempo)
            && self.energy >= TECHNO_MIN_ENERGY
    }

    fn club_band(&self) -> bool {
        (CLUB_MIN_BPM..=CLUB_MAX_BPM).contains(&self.tempo) && self.energy >= CLUB_MIN_ENERGY
    }

    fn dnb_band(&self) -> bool {
        (DNB_MIN_BPM..=DNB_MAX_BPM).contains(&self.tempo)
    }

    fn high_energy_band(&self) -> bool {
        self.tempo > HIGH_TEMPO_BPM || self.energy > HIGH_ENERGY
    }

    fn low_energy_band(&self) -> bool {
        self.energy < LOW_ENERGY_MAX
    }
}

/// One row of the decision table.
pub(crate) struct Rule {
    pub label: Mood,
    pub matches: fn(&Signal) -> bool,
}

/// The decision table. Row order is load-bearing.
pub(crate) static DECISION_TABLE: &[Rule] = &[
    // ---- No reliable beat: drones, pads, noise beds ----
    Rule {
        label: Mood::AmbientDrone,
        matches: |s| s.no_beat() && s.energy < DRONE_MAX_ENERGY,
    },
    Rule {
        label: Mood::AtmosphericTextural,
        matches: |s| s.no_beat() && s.energy < TEXTURAL_MAX_ENERGY,
    },
    Rule {
        label: Mood::AtmosphericTextural,
        matches: |s| {
            s.no_beat() && s.energy < NOISE_MAX_ENERGY && s.brightness < TEXTURAL_MAX_BRIGHTNESS
        },
    },
    Rule {
        label: Mood::NoiseExperimental,
        matches: |s| s.no_beat() && s.energy < NOISE_MAX_ENERGY,
    },
    Rule {
        label: Mood::HarshNoiseExperimental,
        matches: |s| s.no_beat(),
    },
    // ---- Noisy timbre ----
    Rule {
        label: Mood::HarshNoiseExperimental,
        matches: |s| s.noisy() && s.energy > HARSH_NOISE_MIN_ENERGY,
    },
    Rule {
        label: Mood::GlitchExperimental,
        matches: |s| s.noisy(),
    },
    // ---- Techno: 120-145 BPM with sustained energy ----
    Rule {
        label: Mood::TechnoDark,
        matches: |s| s.techno_band() && s.brightness < TECHNO_DARK_MAX_BRIGHTNESS,
    },
    Rule {
        label: Mood::TechnoIndustrial,
        matches: |s| s.techno_band(),
    },
    // ---- Club/house: 100-130 BPM ----
    Rule {
        label: Mood::TechnoDark,
        matches: |s| {
            s.club_band()
                && s.energy > CLUB_RAVE_MIN_ENERGY
                && s.tempo >= CLUB_TECHNO_MIN_BPM
                && s.brightness < TECHNO_DARK_MAX_BRIGHTNESS
        },
    },
    Rule {
        label: Mood::TechnoIndustrial,
        matches: |s| {
            s.club_band() && s.energy > CLUB_RAVE_MIN_ENERGY && s.tempo >= CLUB_TECHNO_MIN_BPM
        },
    },
    Rule {
        label: Mood::EnergeticRave,
        matches: |s| s.club_band() && s.energy > CLUB_RAVE_MIN_ENERGY,
    },
    Rule {
        label: Mood::DiscoFunk,
        matches: |s| s.club_band() && s.tempo < DISCO_MAX_BPM && s.energy < DISCO_MAX_ENERGY,
    },
    Rule {
        label: Mood::HouseDance,
        matches: |s| s.club_band() && s.brightness > HOUSE_MIN_BRIGHTNESS && s.is_major,
    },
    Rule {
        label: Mood::DarkHouse,
        matches: |s| s.club_band() && s.brightness > HOUSE_MIN_BRIGHTNESS,
    },
    Rule {
        label: Mood::DiscoFunk,
        matches: |s| s.club_band() && s.brightness > DISCO_MIN_BRIGHTNESS,
    },
    Rule {
        label: Mood::ClubGroovy,
        matches: |s| s.club_band(),
    },
    // ---- Drum & bass: 148-180 BPM ----
    Rule {
        label: Mood::DrumAndBass,
        matches: |s| s.dnb_band() && s.energy > DNB_MIN_ENERGY,
    },
    Rule {
        label: Mood::BreakbeatFast,
        matches: |s| s.dnb_band() && s.energy > BREAKBEAT_MIN_ENERGY,
    },
    Rule {
        label: Mood::FastAtmospheric,
        matches: |s| s.dnb_band(),
    },
    // ---- Very fast or very loud ----
    Rule {
        label: Mood::HardAggressive,
        matches: |s| s.high_energy_band() && s.energy > AGGRESSIVE_MIN_ENERGY,
    },
    Rule {
        label: Mood::EnergeticRave,
        matches: |s| s.high_energy_band() && s.energy > RAVE_MIN_ENERGY,
    },
    Rule {
        label: Mood::DrivingElectronic,
        matches: |s| s.high_energy_band(),
    },
    // ---- Quiet signals, subdivided by tempo ----
    Rule {
        label: Mood::AmbientAtmospheric,
        matches: |s| {
            s.low_energy_band() && s.tempo < SLOW_MAX_BPM && s.energy < AMBIENT_MAX_ENERGY
        },
    },
    Rule {
        label: Mood::MelancholicSad,
        matches: |s| s.low_energy_band() && s.tempo < SLOW_MAX_BPM && !s.is_major,
    },
    Rule {
        label: Mood::DowntempoRelaxed,
        matches: |s| {
            s.low_energy_band() && s.tempo < SLOW_MAX_BPM && s.energy < RELAXED_MAX_ENERGY
        },
    },
    Rule {
        label: Mood::SlowBurn,
        matches: |s| s.low_energy_band() && s.tempo < SLOW_MAX_BPM,
    },
    Rule {
        label: Mood::DowntempoDark,
        matches: |s| {
            s.low_energy_band()
                && s.tempo < MIDTEMPO_MAX_BPM
                && s.brightness < DOWNTEMPO_DARK_MAX_BRIGHTNESS
        },
    },
    Rule {
        label: Mood::AmbientChill,
        matches: |s| {
            s.low_energy_band() && s.tempo < MIDTEMPO_MAX_BPM && s.energy < CHILL_MAX_ENERGY
        },
    },
    Rule {
        label: Mood::MidtempoGroove,
        matches: |s| s.low_energy_band() && s.tempo < MIDTEMPO_MAX_BPM,
    },
    Rule {
        label: Mood::MinimalSparse,
        matches: |s| s.low_energy_band() && s.energy >= MINIMAL_MIN_ENERGY,
    },
    // ---- Fallback ----
    Rule {
        label: Mood::UpbeatModerate,
        matches: |s| s.energy >= MODERATE_MIN_ENERGY && s.tempo > UPBEAT_MIN_BPM,
    },
    Rule {
        label: Mood::ModerateGroove,
        matches: |s| s.energy >= MODERATE_MIN_ENERGY,
    },
    Rule {
        label: Mood::RelaxedModerate,
        matches: |s| s.energy >= FALLBACK_RELAXED_MIN_ENERGY,
    },
    Rule {
        label: Mood::LowEnergy,
        matches: |_| true,
    },
];

/// Double the tempo of loud mid-tempo tracks. Beat trackers frequently
/// report half tempo for fast electronic music; the high-energy gate keeps
/// genuinely mid-tempo material untouched.
pub fn correct_half_tempo(tempo_bpm: f64, energy: f64) -> f64 {
    if (HALF_TEMPO_MIN_BPM..=HALF_TEMPO_MAX_BPM).contains(&tempo_bpm)
        && energy > HALF_TEMPO_MIN_ENERGY
    {
        tempo_bpm * 2.0
    } else {
        tempo_bpm
    }
}

/// Walk the decision table and return the first matching label.
pub(crate) fn decide(signal: &Signal) -> Mood {
    for rule in DECISION_TABLE {
        if (rule.matches)(signal) {
            return rule.label;
        }
    }
    // The final table row matches unconditionally
    Mood::LowEnergy
}

/// Classify a feature vector into a mood result.
///
/// Pure: identical inputs always produce identical output. Callers that
/// accept untrusted vectors should run [`FeatureVector::validate`] first;
/// the engine assumes finite inputs.
pub fn classify(features: &FeatureVector, key: &KeyEstimate) -> MoodResult {
    let corrected_tempo = correct_half_tempo(features.tempo_bpm, features.energy);
    let signal = Signal {
        tempo: corrected_tempo,
        energy: features.energy,
        brightness: features.brightness(),
        zero_crossing_rate: features.zero_crossing_rate,
        beat_confidence: features.tempo_confidence,
        is_major: key.is_major,
    };

    let mood = decide(&signal);
    let key_name = key.to_string();
    let explanation = explain::render(features.energy, corrected_tempo, signal.brightness, &key_name);
    let similarity_scores = similarity::score_archetypes(
        features.energy,
        corrected_tempo,
        features.spectral_centroid_hz,
    );

    MoodResult {
        mood,
        corrected_tempo,
        key: key_name,
        similarity_scores,
        explanation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::estimate_key;

    fn signal(tempo: f64, energy: f64, brightness: f64) -> Signal {
        Signal {
            tempo,
            energy,
            brightness,
            zero_crossing_rate: 0.1,
            beat_confidence: 0.9,
            is_major: true,
        }
    }

    fn vector(tempo_bpm: f64, energy: f64, centroid: f64) -> FeatureVector {
        FeatureVector {
            tempo_bpm,
            tempo_confidence: 0.9,
            energy,
            spectral_centroid_hz: centroid,
            zero_crossing_rate: 0.1,
            chroma: [0.1; 12],
        }
    }

    fn major_key() -> KeyEstimate {
        KeyEstimate { root: 0, is_major: true }
    }

    #[test]
    fn half_tempo_doubles_loud_midtempo() {
        assert_eq!(correct_half_tempo(100.0, 0.85), 200.0);
        assert_eq!(correct_half_tempo(100.0, 0.5), 100.0);
        assert_eq!(correct_half_tempo(79.9, 0.85), 79.9);
        assert_eq!(correct_half_tempo(145.0, 0.85), 290.0);
        assert_eq!(correct_half_tempo(146.0, 0.85), 146.0);
        // Gate is strictly above 0.8
        assert_eq!(correct_half_tempo(100.0, 0.8), 100.0);
    }

    #[test]
    fn classify_is_deterministic() {
        let v = vector(128.0, 0.62, 1800.0);
        let key = estimate_key(&v.chroma);
        assert_eq!(classify(&v, &key), classify(&v, &key));
    }

    #[test]
    fn corrected_tempo_flows_into_result() {
        let result = classify(&vector(100.0, 0.85, 2500.0), &major_key());
        assert_eq!(result.corrected_tempo, 200.0);

        let result = classify(&vector(100.0, 0.5, 2500.0), &major_key());
        assert_eq!(result.corrected_tempo, 100.0);
    }

    #[test]
    fn no_beat_shadows_noisy_timbre() {
        // Both degenerate conditions hold; the no-beat rule must win
        let s = Signal {
            tempo: 120.0,
            energy: 0.05,
            brightness: 0.5,
            zero_crossing_rate: 0.9,
            beat_confidence: 0.05,
            is_major: false,
        };
        assert_eq!(decide(&s), Mood::AmbientDrone);
    }

    #[test]
    fn noisy_timbre_shadows_genre_bands() {
        // 120 BPM at 0.5 energy would be techno, but the timbre is noise
        let mut s = signal(120.0, 0.5, 0.5);
        s.zero_crossing_rate = 0.3;
        assert_eq!(decide(&s), Mood::HarshNoiseExperimental);

        s.energy = 0.2;
        assert_eq!(decide(&s), Mood::GlitchExperimental);
    }

    #[test]
    fn techno_band_wins_over_club_band() {
        // 125 BPM is inside both bands; energy >= 0.5 routes to techno
        assert_eq!(decide(&signal(125.0, 0.6, 0.3)), Mood::TechnoDark);
        assert_eq!(decide(&signal(125.0, 0.6, 0.5)), Mood::TechnoIndustrial);
        // Below the techno energy floor the club rules take it
        assert_eq!(decide(&signal(125.0, 0.45, 0.45)), Mood::DiscoFunk);
    }

    #[test]
    fn club_band_high_energy_splits() {
        // Fast club range borrows the techno labels
        assert_eq!(decide(&signal(117.0, 0.75, 0.3)), Mood::TechnoDark);
        assert_eq!(decide(&signal(117.0, 0.75, 0.6)), Mood::TechnoIndustrial);
        // Below 115 BPM the same energy is rave
        assert_eq!(decide(&signal(110.0, 0.75, 0.5)), Mood::EnergeticRave);
    }

    #[test]
    fn club_band_brightness_and_mode_splits() {
        let mut s = signal(125.0, 0.3, 0.6);
        assert_eq!(decide(&s), Mood::HouseDance);
        s.is_major = false;
        assert_eq!(decide(&s), Mood::DarkHouse);
        assert_eq!(decide(&signal(105.0, 0.3, 0.6)), Mood::DiscoFunk);
        // Too loud for disco, too dull for house, too slow for techno
        assert_eq!(decide(&signal(110.0, 0.55, 0.35)), Mood::ClubGroovy);
    }

    #[test]
    fn dnb_band_energy_tiers() {
        assert_eq!(decide(&signal(170.0, 0.5, 0.5)), Mood::DrumAndBass);
        assert_eq!(decide(&signal(170.0, 0.3, 0.5)), Mood::BreakbeatFast);
        // The dnb band owns its whole tempo range, even quiet signals
        assert_eq!(decide(&signal(170.0, 0.1, 0.5)), Mood::FastAtmospheric);
    }

    #[test]
    fn high_energy_band_tiers() {
        assert_eq!(decide(&signal(200.0, 0.85, 0.5)), Mood::HardAggressive);
        assert_eq!(decide(&signal(190.0, 0.65, 0.5)), Mood::EnergeticRave);
        assert_eq!(decide(&signal(190.0, 0.4, 0.5)), Mood::DrivingElectronic);
        // Loudness alone is enough to enter the band
        assert_eq!(decide(&signal(60.0, 0.72, 0.5)), Mood::EnergeticRave);
    }

    #[test]
    fn low_energy_slow_tempo_tiers() {
        assert_eq!(decide(&signal(60.0, 0.05, 0.5)), Mood::AmbientAtmospheric);
        let mut s = signal(60.0, 0.12, 0.5);
        s.is_major = false;
        assert_eq!(decide(&s), Mood::MelancholicSad);
        assert_eq!(decide(&signal(60.0, 0.12, 0.5)), Mood::DowntempoRelaxed);
        assert_eq!(decide(&signal(60.0, 0.17, 0.5)), Mood::SlowBurn);
    }

    #[test]
    fn low_energy_midtempo_tiers() {
        assert_eq!(decide(&signal(85.0, 0.15, 0.3)), Mood::DowntempoDark);
        assert_eq!(decide(&signal(85.0, 0.1, 0.5)), Mood::AmbientChill);
        assert_eq!(decide(&signal(85.0, 0.15, 0.5)), Mood::MidtempoGroove);
        assert_eq!(decide(&signal(110.0, 0.1, 0.5)), Mood::MinimalSparse);
    }

    #[test]
    fn fallback_band_tiers() {
        assert_eq!(decide(&signal(146.0, 0.3, 0.5)), Mood::UpbeatModerate);
        assert_eq!(decide(&signal(95.0, 0.3, 0.5)), Mood::ModerateGroove);
        assert_eq!(decide(&signal(95.0, 0.22, 0.5)), Mood::RelaxedModerate);
        // Near-silent at speed falls past the sparse row
        assert_eq!(decide(&signal(110.0, 0.05, 0.5)), Mood::LowEnergy);
    }

    #[test]
    fn band_boundary_at_145_bpm_is_inclusive() {
        assert_eq!(decide(&signal(145.0, 0.5, 0.5)), Mood::TechnoIndustrial);
        assert_eq!(decide(&signal(145.01, 0.5, 0.5)), Mood::UpbeatModerate);
    }

    #[test]
    fn every_label_is_reachable() {
        // One witness signal per table outcome, in vocabulary order
        let cases: &[(Signal, Mood)] = &[
            (
                Signal { beat_confidence: 0.1, ..signal(120.0, 0.1, 0.5) },
                Mood::AmbientDrone,
            ),
            (
                Signal { beat_confidence: 0.1, ..signal(120.0, 0.3, 0.5) },
                Mood::AtmosphericTextural,
            ),
            (
                Signal { beat_confidence: 0.1, ..signal(120.0, 0.6, 0.5) },
                Mood::NoiseExperimental,
            ),
            (
                Signal { beat_confidence: 0.1, ..signal(120.0, 0.8, 0.5) },
                Mood::HarshNoiseExperimental,
            ),
            (
                Signal { zero_crossing_rate: 0.3, ..signal(120.0, 0.2, 0.5) },
                Mood::GlitchExperimental,
            ),
            (signal(130.0, 0.6, 0.3), Mood::TechnoDark),
            (signal(130.0, 0.6, 0.5), Mood::TechnoIndustrial),
            (signal(110.0, 0.75, 0.5), Mood::EnergeticRave),
            (signal(125.0, 0.3, 0.6), Mood::HouseDance),
            (
                Signal { is_major: false, ..signal(125.0, 0.3, 0.6) },
                Mood::DarkHouse,
            ),
            (signal(105.0, 0.3, 0.6), Mood::DiscoFunk),
            (signal(110.0, 0.55, 0.35), Mood::ClubGroovy),
            (signal(170.0, 0.5, 0.5), Mood::DrumAndBass),
            (signal(170.0, 0.3, 0.5), Mood::BreakbeatFast),
            (signal(170.0, 0.1, 0.5), Mood::FastAtmospheric),
            (signal(200.0, 0.85, 0.5), Mood::HardAggressive),
            (signal(190.0, 0.4, 0.5), Mood::DrivingElectronic),
            (signal(60.0, 0.05, 0.5), Mood::AmbientAtmospheric),
            (
                Signal { is_major: false, ..signal(60.0, 0.12, 0.5) },
                Mood::MelancholicSad,
            ),
            (signal(60.0, 0.12, 0.5), Mood::DowntempoRelaxed),
            (signal(60.0, 0.17, 0.5), Mood::SlowBurn),
            (signal(85.0, 0.15, 0.3), Mood::DowntempoDark),
            (signal(85.0, 0.1, 0.5), Mood::AmbientChill),
            (signal(85.0, 0.15, 0.5), Mood::MidtempoGroove),
            (signal(110.0, 0.1, 0.5), Mood::MinimalSparse),
            (signal(146.0, 0.3, 0.5), Mood::UpbeatModerate),
            (signal(95.0, 0.3, 0.5), Mood::ModerateGroove),
            (signal(95.0, 0.22, 0.5), Mood::RelaxedModerate),
            (signal(110.0, 0.05, 0.5), Mood::LowEnergy),
        ];

        for (s, expected) in cases {
            assert_eq!(decide(s), *expected, "signal {s:?}");
        }

        let covered: std::collections::HashSet<_> =
            cases.iter().map(|(_, label)| label).collect();
        assert_eq!(covered.len(), Mood::all().len());
    }

    #[test]
    fn classify_carries_key_and_similarity() {
        let v = vector(125.0, 0.15, 3000.0);
        let result = classify(&v, &estimate_key(&[0.0; 12]));
        assert_eq!(result.key, "C minor");
        assert_eq!(result.similarity_scores["House"], 1.0);
        for score in result.similarity_scores.values() {
            assert!((0.0..=1.0).contains(score));
        }
        assert!(result.explanation.contains("key of C minor"));
    }
}
