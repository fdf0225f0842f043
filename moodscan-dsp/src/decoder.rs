//! Audio decoding to mono PCM at the analysis rate
//!
//! Uses symphonia for format-agnostic decoding (MP3, FLAC, WAV, OGG, AAC,
//! ...), averages channels to mono, and resamples with rubato when the
//! native rate differs from [`ANALYSIS_SAMPLE_RATE`]. Decoding stops once
//! the requested analysis window is filled, so long tracks cost the same
//! as short ones.

use std::path::Path;

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::FromSample;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{AnalysisError, Result};

/// Fixed sample rate all feature extraction runs at.
pub const ANALYSIS_SAMPLE_RATE: u32 = 22_050;

/// Default analysis window in seconds.
pub const DEFAULT_ANALYSIS_SECONDS: f64 = 30.0;

/// Decoded audio: mono samples plus stream facts.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Mono samples in [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate of `samples` in Hz
    pub sample_rate: u32,
    /// Channel count of the source stream
    pub channels: usize,
    /// Seconds of audio captured (capped at the analysis window)
    pub duration_seconds: f64,
}

/// Decode up to `max_seconds` of an audio file to mono f32 samples at the
/// file's native rate.
pub fn decode_audio(path: &Path, max_seconds: f64) -> Result<DecodedAudio> {
    tracing::debug!(path = %path.display(), max_seconds, "decoding audio file");

    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AnalysisError::InvalidAudio(format!("unrecognized audio container: {e}")))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AnalysisError::InvalidAudio("no audio track in file".into()))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AnalysisError::InvalidAudio("sample rate unknown".into()))?;
    let channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(1);

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let max_samples = (max_seconds * sample_rate as f64).ceil() as usize;
    let mut samples: Vec<f32> = Vec::new();

    loop {
        if samples.len() >= max_samples {
            break;
        }

        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder.decode(&packet)?;
        samples.extend_from_slice(&mix_to_mono(&decoded));
    }

    samples.truncate(max_samples);

    if samples.is_empty() {
        return Err(AnalysisError::InvalidAudio(
            "no audio samples decoded".into(),
        ));
    }

    let duration_seconds = samples.len() as f64 / sample_rate as f64;
    tracing::debug!(
        path = %path.display(),
        sample_rate,
        channels,
        samples = samples.len(),
        duration_seconds = format!("{duration_seconds:.2}"),
        "decode complete"
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
        duration_seconds,
    })
}

/// Average all channels of a decoded buffer into mono f32.
fn mix_to_mono(decoded: &AudioBufferRef) -> Vec<f32> {
    macro_rules! downmix {
        ($buf:expr) => {{
            let channels = $buf.spec().channels.count();
            let frames = $buf.frames();
            let mut mono = Vec::with_capacity(frames);
            for frame in 0..frames {
                let mut sum = 0.0f32;
                for ch in 0..channels {
                    sum += f32::from_sample($buf.chan(ch)[frame]);
                }
                mono.push(sum / channels as f32);
            }
            mono
        }};
    }

    match decoded {
        AudioBufferRef::U8(buf) => downmix!(buf),
        AudioBufferRef::U16(buf) => downmix!(buf),
        AudioBufferRef::U24(buf) => downmix!(buf),
        AudioBufferRef::U32(buf) => downmix!(buf),
        AudioBufferRef::S8(buf) => downmix!(buf),
        AudioBufferRef::S16(buf) => downmix!(buf),
        AudioBufferRef::S24(buf) => downmix!(buf),
        AudioBufferRef::S32(buf) => downmix!(buf),
        AudioBufferRef::F32(buf) => downmix!(buf),
        AudioBufferRef::F64(buf) => downmix!(buf),
    }
}

/// Resample mono audio to [`ANALYSIS_SAMPLE_RATE`] with sinc
/// interpolation. Single pass: the chunk size equals the input length.
pub fn resample_to_analysis_rate(audio: DecodedAudio) -> Result<DecodedAudio> {
    if audio.sample_rate == ANALYSIS_SAMPLE_RATE || audio.samples.is_empty() {
        return Ok(audio);
    }

    let params = SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 128,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = ANALYSIS_SAMPLE_RATE as f64 / audio.sample_rate as f64;
    let input_len = audio.samples.len();

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, input_len, 1)
        .map_err(|e| AnalysisError::Resample(e.to_string()))?;

    let output = resampler
        .process(&[audio.samples], None)
        .map_err(|e| AnalysisError::Resample(e.to_string()))?;
    let samples = output.into_iter().next().unwrap_or_default();

    tracing::debug!(
        from_rate = audio.sample_rate,
        to_rate = ANALYSIS_SAMPLE_RATE,
        in_samples = input_len,
        out_samples = samples.len(),
        "resampled to analysis rate"
    );

    Ok(DecodedAudio {
        samples,
        sample_rate: ANALYSIS_SAMPLE_RATE,
        channels: audio.channels,
        duration_seconds: audio.duration_seconds,
    })
}
