//! Human-readable explanation rendering
//!
//! Maps energy, tempo, and brightness onto small descriptive tiers and
//! formats them with the raw numbers so the caller can show both the
//! judgement and the evidence.

/// (upper bound, description) pairs checked in order; the last entry of
/// each table is the unbounded top tier.
const ENERGY_TIERS: [(f64, &str); 5] = [
    (0.1, "very low"),
    (0.2, "low"),
    (0.35, "moderate"),
    (0.5, "high"),
    (f64::INFINITY, "very high"),
];

const BRIGHTNESS_TIERS: [(f64, &str); 3] = [
    (0.3, "dark/mellow"),
    (0.6, "balanced"),
    (f64::INFINITY, "bright/sharp"),
];

const TEMPO_TIERS: [(f64, &str); 5] = [
    (80.0, "slow"),
    (110.0, "moderate"),
    (130.0, "dance"),
    (150.0, "fast"),
    (f64::INFINITY, "very fast"),
];

fn tier(value: f64, tiers: &[(f64, &'static str)]) -> &'static str {
    for &(bound, description) in tiers {
        if value < bound {
            return description;
        }
    }
    // Unreachable for finite input: the last bound is infinite
    tiers[tiers.len() - 1].1
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Render the one-line analysis description.
///
/// `tempo` is the corrected tempo and `brightness` the normalized
/// centroid. Example output:
/// `"Very high energy (0.820), fast tempo (140.0 BPM), bright/sharp
/// timbre, key of A minor"`.
pub fn render(energy: f64, tempo: f64, brightness: f64, key: &str) -> String {
    let energy_desc = capitalize_first(tier(energy, &ENERGY_TIERS));
    let tempo_desc = tier(tempo, &TEMPO_TIERS);
    let brightness_desc = tier(brightness, &BRIGHTNESS_TIERS);

    format!(
        "{energy_desc} energy ({energy:.3}), {tempo_desc} tempo ({tempo:.1} BPM), \
         {brightness_desc} timbre, key of {key}"
    )
}
