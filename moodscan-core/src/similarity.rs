//! Similarity scoring against fixed genre archetypes
//!
//! Each archetype is a reference point in (energy, tempo, brightness)
//! space. Distance is weighted: tempo is the strongest genre discriminant,
//! energy second, brightness third. The weights and reference values are
//! calibrated together with the decision-table thresholds and must not be
//! retuned independently.

use std::collections::BTreeMap;

use crate::types::brightness;

/// Reference point for one genre.
#[derive(Debug, Clone, Copy)]
pub struct Archetype {
    pub name: &'static str,
    pub energy: f64,
    pub tempo: f64,
    pub brightness: f64,
}

/// DJ-relevant reference genres.
pub const ARCHETYPES: [Archetype; 6] = [
    Archetype { name: "House", energy: 0.15, tempo: 125.0, brightness: 0.6 },
    Archetype { name: "Techno", energy: 0.16, tempo: 130.0, brightness: 0.4 },
    Archetype { name: "Disco", energy: 0.14, tempo: 115.0, brightness: 0.7 },
    Archetype { name: "Ambient", energy: 0.04, tempo: 70.0, brightness: 0.5 },
    Archetype { name: "DnB", energy: 0.18, tempo: 170.0, brightness: 0.5 },
    Archetype { name: "Downtempo", energy: 0.08, tempo: 90.0, brightness: 0.4 },
];

const ENERGY_WEIGHT: f64 = 2.0;
const TEMPO_WEIGHT: f64 = 3.0;
const BRIGHTNESS_WEIGHT: f64 = 1.0;
/// Tempo deltas are expressed in units of 100 BPM before weighting
const TEMPO_SCALE: f64 = 100.0;
/// Distance at which similarity bottoms out at zero
const MAX_DISTANCE: f64 = 3.0;

/// Score the signal against every archetype.
///
/// Returns similarity in [0, 1] per genre, rounded to two decimals. Uses
/// the corrected tempo and the raw centroid (normalized here).
pub fn score_archetypes(
    energy: f64,
    corrected_tempo: f64,
    spectral_centroid_hz: f64,
) -> BTreeMap<String, f64> {
    let norm_brightness = brightness(spectral_centroid_hz);

    ARCHETYPES
        .iter()
        .map(|archetype| {
            let energy_diff = ENERGY_WEIGHT * (energy - archetype.energy);
            let tempo_diff = TEMPO_WEIGHT * (corrected_tempo - archetype.tempo) / TEMPO_SCALE;
            let brightness_diff = BRIGHTNESS_WEIGHT * (norm_brightness - archetype.brightness);

            let distance =
                (energy_diff.powi(2) + tempo_diff.powi(2) + brightness_diff.powi(2)).sqrt();
            let similarity = (1.0 - distance / MAX_DISTANCE).max(0.0);

            (archetype.name.to_string(), round_two_places(similarity))
        })
        .collect()
}

fn round_two_places(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
