//! Key/mode estimation from a 12-bin chroma vector
//!
//! The root is the strongest pitch class; mode is decided by comparing the
//! strength of the major third (root + 4 semitones) against the minor
//! third (root + 3). Interval strength, not template correlation: the
//! chroma vectors this stage sees are time-averaged magnitudes where the
//! third interval is the most reliable major/minor discriminator.

use crate::types::KeyEstimate;

/// Estimate the musical key from a chroma vector.
///
/// Ties on the root resolve to the lowest pitch-class index (first maximum
/// wins), and a tie between thirds resolves to minor. Any finite 12-vector
/// is accepted; an all-zero chroma therefore yields "C minor".
pub fn estimate_key(chroma: &[f64; 12]) -> KeyEstimate {
    let mut root = 0;
    for (idx, &value) in chroma.iter().enumerate() {
        if value > chroma[root] {
            root = idx;
        }
    }

    let major_third = chroma[(root + 4) % 12];
    let minor_third = chroma[(root + 3) % 12];

    KeyEstimate {
        root,
        is_major: major_third > minor_third,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chroma_with(values: &[(usize, f64)]) -> [f64; 12] {
        let mut chroma = [0.0; 12];
        for &(idx, value) in values {
            chroma[idx] = value;
        }
        chroma
    }

    #[test]
    fn detects_root_from_strongest_bin() {
        // A (index 9) dominates, C# (index 1) is the major third above it
        let chroma = chroma_with(&[(9, 1.0), (1, 0.8), (0, 0.3)]);
        let key = estimate_key(&chroma);
        assert_eq!(key.root, 9);
        assert!(key.is_major);
        assert_eq!(key.to_string(), "A major");
    }

    #[test]
    fn minor_third_dominance_yields_minor() {
        // A root with C (minor third, index 0) stronger than C# (index 1)
        let chroma = chroma_with(&[(9, 1.0), (0, 0.9), (1, 0.2)]);
        let key = estimate_key(&chroma);
        assert_eq!(key.root, 9);
        assert!(!key.is_major);
        assert_eq!(key.to_string(), "A minor");
    }

    #[test]
    fn all_zero_chroma_is_c_minor() {
        let key = estimate_key(&[0.0; 12]);
        assert_eq!(key.root, 0);
        assert!(!key.is_major);
        assert_eq!(key.to_string(), "C minor");
    }

    #[test]
    fn root_tie_resolves_to_lowest_index() {
        // D and G tie; D (index 2) is encountered first
        let chroma = chroma_with(&[(2, 0.7), (7, 0.7)]);
        assert_eq!(estimate_key(&chroma).root, 2);
    }

    #[test]
    fn third_tie_resolves_to_minor() {
        // Equal major and minor thirds above C
        let chroma = chroma_with(&[(0, 1.0), (3, 0.5), (4, 0.5)]);
        assert!(!estimate_key(&chroma).is_major);
    }

    #[test]
    fn interval_wraps_around_the_octave() {
        // Root B (index 11): major third is D# (index 3), minor third D (index 2)
        let chroma = chroma_with(&[(11, 1.0), (3, 0.6), (2, 0.1)]);
        let key = estimate_key(&chroma);
        assert_eq!(key.root, 11);
        assert!(key.is_major);
    }
}
