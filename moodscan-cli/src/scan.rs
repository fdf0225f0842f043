//! Directory scanning into the library cache
//!
//! Walks a directory for supported audio files, analyzes whatever the
//! cache does not already cover, persists the cache, and prints the
//! filtered library sorted by path.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use chrono::Utc;
use moodscan_dsp::{analyze_batch, is_supported_extension, AnalysisOptions};
use walkdir::WalkDir;

use crate::cache::{CacheEntry, LibraryCache};

/// Library listing filters. Text filters are case-insensitive substring
/// matches; numeric ranges are inclusive.
#[derive(Debug, Default)]
pub struct Filters {
    pub mood: Option<String>,
    pub key: Option<String>,
    pub tempo_min: Option<f64>,
    pub tempo_max: Option<f64>,
    pub energy_min: Option<f64>,
    pub energy_max: Option<f64>,
}

impl Filters {
    pub fn matches(&self, entry: &CacheEntry) -> bool {
        if let Some(mood) = &self.mood {
            if !entry.mood.to_lowercase().contains(&mood.to_lowercase()) {
                return false;
            }
        }
        if let Some(key) = &self.key {
            if !entry.key.to_lowercase().contains(&key.to_lowercase()) {
                return false;
            }
        }
        if let Some(min) = self.tempo_min {
            if entry.tempo_bpm < min {
                return false;
            }
        }
        if let Some(max) = self.tempo_max {
            if entry.tempo_bpm > max {
                return false;
            }
        }
        if let Some(min) = self.energy_min {
            if entry.energy < min {
                return false;
            }
        }
        if let Some(max) = self.energy_max {
            if entry.energy > max {
                return false;
            }
        }
        true
    }
}

/// Scan `dir`, refresh the cache at `cache_path`, print the library.
pub async fn run(
    dir: &Path,
    cache_path: &Path,
    filters: &Filters,
    workers: Option<usize>,
    refresh: bool,
) -> Result<()> {
    let files = find_audio_files(dir)?;
    tracing::info!(found = files.len(), dir = %dir.display(), "scan started");

    let mut cache = LibraryCache::load(cache_path);

    // Split into cache hits and files needing analysis
    let mut pending: Vec<(PathBuf, u64, i64)> = Vec::new();
    let mut hits = 0usize;
    for path in files {
        let meta = std::fs::metadata(&path)
            .with_context(|| format!("reading metadata for {}", path.display()))?;
        let file_size = meta.len();
        let modified_unix = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        let cache_key = path.to_string_lossy();
        if !refresh && cache.hit(&cache_key, file_size, modified_unix).is_some() {
            hits += 1;
        } else {
            pending.push((path, file_size, modified_unix));
        }
    }

    // The library keeps the duration sentence in each explanation
    let opts = AnalysisOptions {
        detailed: true,
        ..AnalysisOptions::default()
    };
    let paths: Vec<PathBuf> = pending.iter().map(|(p, _, _)| p.clone()).collect();
    let results = analyze_batch(paths, opts, workers).await;

    let mut analyzed = 0usize;
    let mut failed = 0usize;
    for ((path, file_size, modified_unix), (_, result)) in pending.into_iter().zip(results) {
        match result {
            Ok(analysis) => {
                analyzed += 1;
                cache.insert(CacheEntry {
                    path,
                    file_size,
                    modified_unix,
                    mood: analysis.mood_result.mood.to_string(),
                    tempo_bpm: analysis.mood_result.corrected_tempo,
                    energy: analysis.features.energy,
                    key: analysis.mood_result.key,
                    explanation: analysis.mood_result.explanation,
                    analyzed_at: Utc::now(),
                    duration_seconds: analysis.duration_seconds,
                });
            }
            // analyze_batch already logged the cause
            Err(_) => failed += 1,
        }
    }

    cache.save(cache_path)?;
    tracing::info!(analyzed, cached = hits, failed, "scan complete");

    print_library(&cache, filters);
    Ok(())
}

/// Supported audio files under `dir`, absolute and sorted.
fn find_audio_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_supported_extension(entry.path()))
        .map(|entry| {
            // Absolute cache keys stay stable across working directories
            entry
                .path()
                .canonicalize()
                .unwrap_or_else(|_| entry.path().to_path_buf())
        })
        .collect();
    files.sort();
    Ok(files)
}

fn print_library(cache: &LibraryCache, filters: &Filters) {
    let total = cache.entries.len();
    let mut shown = 0usize;

    println!(
        "{:<24} {:>7} {:>7}  {:<9} PATH",
        "MOOD", "TEMPO", "ENERGY", "KEY"
    );
    for entry in cache.entries.values() {
        if !filters.matches(entry) {
            continue;
        }
        shown += 1;
        println!(
            "{:<24} {:>7.1} {:>7.3}  {:<9} {}",
            entry.mood,
            entry.tempo_bpm,
            entry.energy,
            entry.key,
            entry.path.display()
        );
    }

    println!();
    println!("Showing {shown} / {total} tracks");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(mood: &str, key: &str, tempo: f64, energy: f64) -> CacheEntry {
        CacheEntry {
            path: PathBuf::from("/music/track.mp3"),
            file_size: 1,
            modified_unix: 0,
            mood: mood.to_string(),
            tempo_bpm: tempo,
            energy,
            key: key.to_string(),
            explanation: String::new(),
            analyzed_at: Utc::now(),
            duration_seconds: 30.0,
        }
    }

    #[test]
    fn empty_filters_match_everything() {
        let filters = Filters::default();
        assert!(filters.matches(&entry("Techno/Dark", "A minor", 128.0, 0.6)));
    }

    #[test]
    fn mood_filter_is_case_insensitive_substring() {
        let filters = Filters {
            mood: Some("techno".to_string()),
            ..Filters::default()
        };
        assert!(filters.matches(&entry("Techno/Dark", "A minor", 128.0, 0.6)));
        assert!(filters.matches(&entry("Techno/Industrial", "C major", 140.0, 0.7)));
        assert!(!filters.matches(&entry("House/Dance", "A minor", 124.0, 0.4)));
    }

    #[test]
    fn key_filter_is_case_insensitive_substring() {
        let filters = Filters {
            key: Some("minor".to_string()),
            ..Filters::default()
        };
        assert!(filters.matches(&entry("Techno/Dark", "F# minor", 128.0, 0.6)));
        assert!(!filters.matches(&entry("Techno/Dark", "F# major", 128.0, 0.6)));
    }

    #[test]
    fn tempo_range_is_inclusive() {
        let filters = Filters {
            tempo_min: Some(120.0),
            tempo_max: Some(130.0),
            ..Filters::default()
        };
        assert!(filters.matches(&entry("x", "y", 120.0, 0.5)));
        assert!(filters.matches(&entry("x", "y", 130.0, 0.5)));
        assert!(!filters.matches(&entry("x", "y", 119.9, 0.5)));
        assert!(!filters.matches(&entry("x", "y", 130.1, 0.5)));
    }

    #[test]
    fn energy_range_is_inclusive() {
        let filters = Filters {
            energy_min: Some(0.2),
            energy_max: Some(0.8),
            ..Filters::default()
        };
        assert!(filters.matches(&entry("x", "y", 100.0, 0.2)));
        assert!(filters.matches(&entry("x", "y", 100.0, 0.8)));
        assert!(!filters.matches(&entry("x", "y", 100.0, 0.19)));
        assert!(!filters.matches(&entry("x", "y", 100.0, 0.81)));
    }

    #[test]
    fn combined_filters_all_apply() {
        let filters = Filters {
            mood: Some("dark".to_string()),
            tempo_min: Some(125.0),
            ..Filters::default()
        };
        assert!(filters.matches(&entry("Techno/Dark", "A minor", 128.0, 0.6)));
        assert!(!filters.matches(&entry("Techno/Dark", "A minor", 110.0, 0.6)));
        assert!(!filters.matches(&entry("House/Dance", "A minor", 128.0, 0.6)));
    }

    fn write_tone(path: &Path, seconds: f64) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let frames = (seconds * 22_050.0) as usize;
        for i in 0..frames {
            let t = i as f32 / 22_050.0;
            let v = 0.3 * (2.0 * std::f32::consts::PI * 440.0 * t).sin();
            writer.write_sample((v * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[tokio::test]
    async fn scan_populates_then_reuses_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let music = dir.path().join("music");
        std::fs::create_dir(&music).unwrap();
        write_tone(&music.join("tone.wav"), 1.0);
        let cache_path = dir.path().join("cache").join("library.json");

        run(&music, &cache_path, &Filters::default(), Some(1), false)
            .await
            .unwrap();
        let first = LibraryCache::load(&cache_path);
        assert_eq!(first.entries.len(), 1);
        let first_stamp = first.entries.values().next().unwrap().analyzed_at;

        // Unchanged file: the second scan reuses the entry as-is
        run(&music, &cache_path, &Filters::default(), Some(1), false)
            .await
            .unwrap();
        let second = LibraryCache::load(&cache_path);
        assert_eq!(
            second.entries.values().next().unwrap().analyzed_at,
            first_stamp
        );

        // Refresh re-analyzes even on a hit
        run(&music, &cache_path, &Filters::default(), Some(1), true)
            .await
            .unwrap();
        let third = LibraryCache::load(&cache_path);
        assert!(third.entries.values().next().unwrap().analyzed_at >= first_stamp);
    }

    #[test]
    fn finds_only_supported_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("track.mp3"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/nested.wav"), b"x").unwrap();

        let files = find_audio_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.is_absolute()));
        assert!(files[0] < files[1]);
    }

    #[test]
    fn rejects_non_directory() {
        assert!(find_audio_files(Path::new("/nonexistent")).is_err());
    }
}
