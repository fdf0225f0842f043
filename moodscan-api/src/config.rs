//! Configuration loading for moodscan-api
//!
//! Resolution follows the flag → environment → TOML file → default
//! priority order. Flags and environment variables are folded together
//! by clap in main, so this module covers the file and default tiers.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default listen port
pub const DEFAULT_PORT: u16 = 5720;

/// Default request body cap in bytes (64 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Default cap on decoded audio per upload, in seconds
pub const DEFAULT_MAX_ANALYSIS_SECONDS: f64 = 30.0;

/// Runtime configuration for the API service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Bind address
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,
    /// Uploads longer than this are analyzed over a leading slice only
    pub max_analysis_seconds: f64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_analysis_seconds: DEFAULT_MAX_ANALYSIS_SECONDS,
        }
    }
}

impl ApiConfig {
    /// Load configuration from a TOML file.
    ///
    /// An explicit path must exist and parse. Without one, the platform
    /// config file is used when present and defaults apply otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}

/// Platform configuration file path: `<config dir>/moodscan/api.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("moodscan").join("api.toml"))
}
