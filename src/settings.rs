//! Persistent settings (`radarloop.json`)
//!
//! Missing fields fall back to defaults, so older or hand-written files keep
//! loading. CLI flags are layered on top by `main`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Settings file name inside the config directory
pub const SETTINGS_FILE: &str = "radarloop.json";

pub const DEFAULT_MANIFEST_URL: &str = "https://alltobid.529000.xyz/radar.php";
pub const DEFAULT_BASE_URL: &str = "https://alltobid.529000.xyz/radar/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Manifest listing endpoint
    pub manifest_url: String,
    /// Frame URL prefix (frame name is appended)
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub workers_override: u32, // 0 = auto
    /// Frame cache directory; platform default when unset
    pub cache_dir: Option<std::path::PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_secs: 10,
            read_timeout_secs: 30,
            workers_override: 0,
            cache_dir: None,
        }
    }
}

impl Settings {
    /// Load from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("Failed to parse settings: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(path, json).with_context(|| format!("Failed to write settings: {}", path.display()))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs.max(1))
    }

    /// Worker thread count: override, or half the cores (I/O bound work)
    pub fn worker_count(&self) -> usize {
        match self.workers_override {
            0 => (num_cpus::get() / 2).clamp(1, 4),
            n => n as usize,
        }
    }
}
