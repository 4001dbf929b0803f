use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "radarloop";

/// Files whose presence in the working directory makes it the config dir
const LOCAL_MARKERS: [&str; 2] = ["radarloop.json", "radarloop.log"];

/// Overrides for the default application directories
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
    /// Custom frame cache directory (from CLI or settings)
    pub cache_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Priority: CLI args → ENV var (RADARLOOP_CONFIG_DIR) → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>, cache_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var_os("RADARLOOP_CONFIG_DIR").map(PathBuf::from));
        Self { config_dir, cache_dir }
    }
}

/// Path to a configuration file.
///
/// Priority:
/// 1. `--config-dir` / `RADARLOOP_CONFIG_DIR`
/// 2. Working directory, if it already holds radarloop files
/// 3. Platform config dir (`~/.config/radarloop` on Linux)
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    config_dir(config).join(name)
}

/// Path to a data file (logs). Same priority as `config_file`, platform
/// fallback is the data dir (`~/.local/share/radarloop` on Linux).
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    data_dir(config).join(name)
}

/// Directory holding cached frames.
///
/// Explicit override first, then the platform cache dir
/// (`~/.cache/radarloop/frames` on Linux).
pub fn frame_cache_dir(config: &PathConfig) -> PathBuf {
    if let Some(dir) = &config.cache_dir {
        return dir.clone();
    }
    dirs_next::cache_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| data_dir(config).join("cache"))
        .join("frames")
}

/// Create config, data and cache directories if missing.
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    for dir in [config_dir(config), data_dir(config), frame_cache_dir(config)] {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(())
}

fn has_local_files(dir: &Path) -> bool {
    LOCAL_MARKERS.iter().any(|f| dir.join(f).exists())
}

fn local_dir() -> Option<PathBuf> {
    std::env::current_dir().ok().filter(|d| has_local_files(d))
}

fn config_dir(config: &PathConfig) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }
    local_dir()
        .or_else(|| dirs_next::config_dir().map(|d| d.join(APP_DIR)))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn data_dir(config: &PathConfig) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }
    local_dir()
        .or_else(|| dirs_next::data_dir().map(|d| d.join(APP_DIR)))
        .unwrap_or_else(|| PathBuf::from("."))
}
