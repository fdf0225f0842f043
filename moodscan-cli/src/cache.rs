//! Persistent library cache for scan results
//!
//! A single JSON document keyed by absolute path. An entry is reused
//! only while the file's size and mtime still match; anything corrupt
//! or missing on disk degrades to an empty cache with a warning rather
//! than failing the scan.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const CACHE_VERSION: u32 = 1;

/// One analyzed track as remembered between scans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub path: PathBuf,
    pub file_size: u64,
    pub modified_unix: i64,
    pub mood: String,
    pub tempo_bpm: f64,
    pub energy: f64,
    pub key: String,
    pub explanation: String,
    pub analyzed_at: DateTime<Utc>,
    pub duration_seconds: f64,
}

/// The on-disk library document.
#[derive(Debug, Serialize, Deserialize)]
pub struct LibraryCache {
    pub version: u32,
    /// Absolute path -> entry; BTreeMap keeps listing order stable
    pub entries: BTreeMap<String, CacheEntry>,
}

impl LibraryCache {
    pub fn empty() -> Self {
        Self {
            version: CACHE_VERSION,
            entries: BTreeMap::new(),
        }
    }

    /// Load a cache file. Missing, unreadable, or corrupt caches are
    /// never fatal; the scan just starts from scratch.
    pub fn load(path: &Path) -> Self {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::empty(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cache unreadable, rebuilding");
                return Self::empty();
            }
        };

        match serde_json::from_slice::<LibraryCache>(&bytes) {
            Ok(cache) if cache.version == CACHE_VERSION => cache,
            Ok(cache) => {
                tracing::warn!(
                    path = %path.display(),
                    found = cache.version,
                    expected = CACHE_VERSION,
                    "cache version mismatch, rebuilding"
                );
                Self::empty()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cache corrupt, rebuilding");
                Self::empty()
            }
        }
    }

    /// Persist atomically: write a sibling temp file, then rename it
    /// over the target so readers never observe a half-written cache.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating cache directory {}", parent.display()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .with_context(|| format!("creating temp file in {}", parent.display()))?;
        serde_json::to_writer_pretty(&mut tmp, self).context("serializing cache")?;
        tmp.flush().context("flushing cache")?;
        tmp.persist(path)
            .with_context(|| format!("replacing cache at {}", path.display()))?;

        tracing::debug!(path = %path.display(), entries = self.entries.len(), "cache saved");
        Ok(())
    }

    /// Entry for `path` if the file on disk is still the one analyzed.
    pub fn hit(&self, path: &str, file_size: u64, modified_unix: i64) -> Option<&CacheEntry> {
        self.entries
            .get(path)
            .filter(|e| e.file_size == file_size && e.modified_unix == modified_unix)
    }

    pub fn insert(&mut self, entry: CacheEntry) {
        let key = entry.path.to_string_lossy().into_owned();
        self.entries.insert(key, entry);
    }
}

/// Default cache location, `~/.cache/moodscan/library.json` on Linux.
pub fn default_cache_path() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("no cache directory on this platform")?;
    Ok(base.join("moodscan").join("library.json"))
}
