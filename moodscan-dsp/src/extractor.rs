//! Feature extraction over mono analysis-rate audio
//!
//! Frames the signal with a short-time Fourier transform (window 2048,
//! hop 512, Hann) and averages per-frame measures into one
//! [`FeatureVector`]: RMS energy, spectral centroid, zero-crossing rate,
//! a 12-bin chroma profile, and tempo from autocorrelation of the
//! positive spectral-flux onset envelope.

use moodscan_core::FeatureVector;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::decoder::DecodedAudio;

/// STFT window length in samples.
const WINDOW_SIZE: usize = 2048;
/// STFT hop length in samples.
const HOP_SIZE: usize = 512;

/// Mean frame RMS is stretched by this factor before clamping to [0, 1].
/// Musical material averages well below full scale; the classifier's
/// energy thresholds assume this scaling.
const ENERGY_RMS_SCALE: f64 = 2.5;

/// Tempo search range in BPM.
const MIN_TEMPO_BPM: f64 = 40.0;
const MAX_TEMPO_BPM: f64 = 220.0;

/// Tempo reported when the onset envelope carries no usable periodicity.
const DEFAULT_TEMPO_BPM: f64 = 120.0;

/// Reference tuning for pitch-class mapping (A4 = MIDI 69).
const A4_HZ: f64 = 440.0;
const A4_MIDI: f64 = 69.0;

/// Classifier input plus the decoded span it was measured over.
#[derive(Debug, Clone)]
pub struct ExtractedFeatures {
    pub features: FeatureVector,
    pub duration_seconds: f64,
}

/// Extract a [`FeatureVector`] from decoded mono audio.
///
/// Input shorter than one window produces all-zero measures with the
/// default tempo, which the degenerate classifier rules then absorb.
pub fn extract_features(audio: &DecodedAudio) -> ExtractedFeatures {
    let samples = &audio.samples;
    let sample_rate = audio.sample_rate;
    let bin_hz = sample_rate as f64 / WINDOW_SIZE as f64;

    let frames = if samples.len() >= WINDOW_SIZE {
        1 + (samples.len() - WINDOW_SIZE) / HOP_SIZE
    } else {
        0
    };

    let hann = hann_window(WINDOW_SIZE);
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(WINDOW_SIZE);

    let mut rms_sum = 0.0;
    let mut zcr_sum = 0.0;
    let mut centroid_sum = 0.0;
    let mut chroma_sum = [0.0f64; 12];
    let mut onset_envelope = Vec::with_capacity(frames);
    let mut prev_spectrum: Option<Vec<f32>> = None;

    for i in 0..frames {
        let frame = &samples[i * HOP_SIZE..i * HOP_SIZE + WINDOW_SIZE];

        rms_sum += frame_rms(frame);
        zcr_sum += sign_change_fraction(frame);

        let spectrum = magnitude_spectrum(frame, &hann, fft.as_ref());
        centroid_sum += spectral_centroid_hz(&spectrum, bin_hz);
        accumulate_chroma(&mut chroma_sum, &spectrum, bin_hz);

        // Positive spectral flux; the first frame has no predecessor
        let flux = match &prev_spectrum {
            Some(prev) => positive_flux(prev, &spectrum),
            None => 0.0,
        };
        onset_envelope.push(flux);
        prev_spectrum = Some(spectrum);
    }

    let (energy, spectral_centroid_hz, zero_crossing_rate, chroma) = if frames == 0 {
        (0.0, 0.0, 0.0, [0.0; 12])
    } else {
        let n = frames as f64;
        let mut chroma = chroma_sum.map(|v| v / n);
        let max = chroma.iter().fold(0.0f64, |m, &v| m.max(v));
        if max > 0.0 {
            for bin in &mut chroma {
                *bin /= max;
            }
        }
        (
            (rms_sum / n * ENERGY_RMS_SCALE).clamp(0.0, 1.0),
            centroid_sum / n,
            zcr_sum / n,
            chroma,
        )
    };

    let frame_rate = sample_rate as f64 / HOP_SIZE as f64;
    let (tempo_bpm, tempo_confidence) = estimate_tempo(&onset_envelope, frame_rate);

    tracing::debug!(
        tempo_bpm = format!("{tempo_bpm:.1}"),
        tempo_confidence = format!("{tempo_confidence:.2}"),
        energy = format!("{energy:.3}"),
        centroid_hz = format!("{spectral_centroid_hz:.0}"),
        zcr = format!("{zero_crossing_rate:.3}"),
        frames,
        "features extracted"
    );

    ExtractedFeatures {
        features: FeatureVector {
            tempo_bpm,
            tempo_confidence,
            energy,
            spectral_centroid_hz,
            zero_crossing_rate,
            chroma,
        },
        duration_seconds: audio.duration_seconds,
    }
}

/// Hann window to reduce spectral leakage.
fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            0.5 * (1.0 - ((2.0 * std::f32::consts::PI * i as f32) / (size as f32 - 1.0)).cos())
        })
        .collect()
}

fn frame_rms(frame: &[f32]) -> f64 {
    let sum_squares: f64 = frame.iter().map(|&s| (s as f64).powi(2)).sum();
    (sum_squares / frame.len() as f64).sqrt()
}

/// Fraction of adjacent sample pairs that change sign.
fn sign_change_fraction(frame: &[f32]) -> f64 {
    if frame.len() < 2 {
        return 0.0;
    }
    let crossings = frame
        .windows(2)
        .filter(|w| (w[0] >= 0.0 && w[1] < 0.0) || (w[0] < 0.0 && w[1] >= 0.0))
        .count();
    crossings as f64 / (frame.len() - 1) as f64
}

/// Windowed forward FFT, magnitudes of the non-negative frequency bins.
fn magnitude_spectrum(frame: &[f32], window: &[f32], fft: &dyn Fft<f32>) -> Vec<f32> {
    let mut buffer: Vec<Complex<f32>> = frame
        .iter()
        .zip(window)
        .map(|(&sample, &w)| Complex::new(sample * w, 0.0))
        .collect();
    fft.process(&mut buffer);
    buffer[..frame.len() / 2 + 1].iter().map(|c| c.norm()).collect()
}

/// Magnitude-weighted mean frequency. Zero-magnitude frames contribute 0.
fn spectral_centroid_hz(spectrum: &[f32], bin_hz: f64) -> f64 {
    let mut weighted = 0.0;
    let mut total = 0.0;
    for (bin, &mag) in spectrum.iter().enumerate() {
        weighted += bin as f64 * bin_hz * mag as f64;
        total += mag as f64;
    }
    if total > f64::EPSILON {
        weighted / total
    } else {
        0.0
    }
}

/// Fold each bin's center frequency onto its 12-TET pitch class and
/// accumulate magnitude. The DC bin has no pitch and is skipped.
fn accumulate_chroma(chroma: &mut [f64; 12], spectrum: &[f32], bin_hz: f64) {
    for (bin, &mag) in spectrum.iter().enumerate().skip(1) {
        let freq = bin as f64 * bin_hz;
        let midi = A4_MIDI + 12.0 * (freq / A4_HZ).log2();
        let pitch_class = (midi.round() as i64).rem_euclid(12) as usize;
        chroma[pitch_class] += mag as f64;
    }
}

/// Sum of positive per-bin magnitude increases between consecutive frames.
fn positive_flux(prev: &[f32], current: &[f32]) -> f64 {
    prev.iter()
        .zip(current)
        .map(|(&p, &c)| f64::from((c - p).max(0.0)))
        .sum()
}

/// Tempo and confidence from autocorrelation of the onset envelope.
///
/// The envelope is mean-centered so a flat envelope (silence, steady
/// drones) autocorrelates to zero everywhere and scores confidence 0
/// rather than trivially correlating with its own DC offset. The
/// strongest lag in the 40-220 BPM range wins; confidence is that lag's
/// autocorrelation normalized by the zero-lag value.
fn estimate_tempo(envelope: &[f64], frame_rate: f64) -> (f64, f64) {
    let min_lag = (60.0 * frame_rate / MAX_TEMPO_BPM).ceil() as usize;
    let max_lag = (60.0 * frame_rate / MIN_TEMPO_BPM).floor() as usize;

    if min_lag == 0 || envelope.len() <= max_lag {
        return (DEFAULT_TEMPO_BPM, 0.0);
    }

    let mean = envelope.iter().sum::<f64>() / envelope.len() as f64;
    let centered: Vec<f64> = envelope.iter().map(|v| v - mean).collect();

    let acf_zero: f64 = centered.iter().map(|v| v * v).sum();
    if acf_zero <= f64::EPSILON {
        return (DEFAULT_TEMPO_BPM, 0.0);
    }

    let mut best_lag = min_lag;
    let mut best_value = f64::NEG_INFINITY;
    for lag in min_lag..=max_lag {
        let value: f64 = centered[..centered.len() - lag]
            .iter()
            .zip(&centered[lag..])
            .map(|(a, b)| a * b)
            .sum();
        if value > best_value {
            best_value = value;
            best_lag = lag;
        }
    }

    let tempo = 60.0 * frame_rate / best_lag as f64;
    let confidence = (best_value / acf_zero).clamp(0.0, 1.0);
    (tempo, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::ANALYSIS_SAMPLE_RATE;

    fn audio_from(samples: Vec<f32>) -> DecodedAudio {
        let duration_seconds = samples.len() as f64 / ANALYSIS_SAMPLE_RATE as f64;
        DecodedAudio {
            samples,
            sample_rate: ANALYSIS_SAMPLE_RATE,
            channels: 1,
            duration_seconds,
        }
    }

    fn sine(freq: f32, amplitude: f32, seconds: f64) -> Vec<f32> {
        let rate = ANALYSIS_SAMPLE_RATE as f32;
        let count = (seconds * ANALYSIS_SAMPLE_RATE as f64) as usize;
        (0..count)
            .map(|i| amplitude * (2.0 * std::f32::consts::PI * freq * i as f32 / rate).sin())
            .collect()
    }

    // Deterministic white noise, xorshift64
    fn noise(amplitude: f32, count: usize, mut state: u64) -> Vec<f32> {
        (0..count)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                let unit = (state >> 11) as f32 / (1u64 << 53) as f32;
                amplitude * (2.0 * unit - 1.0)
            })
            .collect()
    }

    #[test]
    fn energy_scales_mean_rms() {
        // A 0.2-amplitude sine has RMS 0.1414; scaled by 2.5 -> 0.354
        let extracted = extract_features(&audio_from(sine(440.0, 0.2, 2.0)));
        let energy = extracted.features.energy;
        assert!(
            (energy - 0.354).abs() < 0.02,
            "unexpected scaled energy {energy}"
        );
    }

    #[test]
    fn energy_clamps_at_one() {
        let extracted = extract_features(&audio_from(sine(440.0, 0.9, 2.0)));
        assert_eq!(extracted.features.energy, 1.0);
    }

    #[test]
    fn centroid_tracks_brightness() {
        let dark = extract_features(&audio_from(sine(220.0, 0.5, 2.0)));
        let bright = extract_features(&audio_from(sine(3000.0, 0.5, 2.0)));
        let dark_hz = dark.features.spectral_centroid_hz;
        let bright_hz = bright.features.spectral_centroid_hz;
        assert!(
            bright_hz > dark_hz,
            "bright {bright_hz} not above dark {dark_hz}"
        );
        assert!((dark_hz - 220.0).abs() < 40.0, "dark centroid {dark_hz}");
        assert!(
            (bright_hz - 3000.0).abs() < 60.0,
            "bright centroid {bright_hz}"
        );
    }

    #[test]
    fn zcr_separates_noise_from_tone() {
        let tone = extract_features(&audio_from(sine(440.0, 0.5, 2.0)));
        let hiss = extract_features(&audio_from(noise(0.5, 44_100, 0x5eed)));
        let tone_zcr = tone.features.zero_crossing_rate;
        let hiss_zcr = hiss.features.zero_crossing_rate;
        assert!(hiss_zcr > tone_zcr);
        // White noise flips sign about half the time, well past the
        // classifier's noisy-timbre threshold
        assert!(hiss_zcr > 0.25, "noise zcr {hiss_zcr}");
        assert!(tone_zcr < 0.1, "tone zcr {tone_zcr}");
    }

    #[test]
    fn chroma_peaks_at_played_pitch_class() {
        // A4 = 440 Hz, pitch class 9
        let extracted = extract_features(&audio_from(sine(440.0, 0.5, 2.0)));
        let chroma = extracted.features.chroma;
        let argmax = chroma
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(argmax, 9, "chroma {chroma:?}");
        assert_eq!(chroma[9], 1.0);
    }

    #[test]
    fn tempo_locks_onto_click_track() {
        // Clicks every 21 hops (10752 samples) = 123.05 BPM at 22.05 kHz
        let rate = ANALYSIS_SAMPLE_RATE as usize;
        let mut samples = vec![0.0f32; rate * 10];
        let period = 21 * HOP_SIZE;
        let mut at = 0;
        while at + 256 < samples.len() {
            for i in 0..256 {
                samples[at + i] = if i % 2 == 0 { 0.9 } else { -0.9 };
            }
            at += period;
        }

        let extracted = extract_features(&audio_from(samples));
        let tempo = extracted.features.tempo_bpm;
        let confidence = extracted.features.tempo_confidence;
        assert!((tempo - 123.0).abs() < 2.0, "tempo {tempo}");
        assert!(confidence > 0.1, "confidence {confidence}");
    }

    #[test]
    fn silence_reports_default_tempo_with_zero_confidence() {
        let extracted = extract_features(&audio_from(vec![0.0; 22_050 * 5]));
        assert_eq!(extracted.features.tempo_bpm, DEFAULT_TEMPO_BPM);
        assert_eq!(extracted.features.tempo_confidence, 0.0);
        assert_eq!(extracted.features.energy, 0.0);
    }

    #[test]
    fn input_shorter_than_a_window_degrades_cleanly() {
        let extracted = extract_features(&audio_from(vec![0.3; WINDOW_SIZE - 1]));
        assert_eq!(extracted.features.energy, 0.0);
        assert_eq!(extracted.features.tempo_bpm, DEFAULT_TEMPO_BPM);
        assert_eq!(extracted.features.chroma, [0.0; 12]);
    }

    #[test]
    fn duration_reports_decoded_span() {
        let extracted = extract_features(&audio_from(sine(440.0, 0.5, 2.0)));
        assert!((extracted.duration_seconds - 2.0).abs() < 1e-6);
    }
}
