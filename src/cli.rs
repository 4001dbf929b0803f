use clap::Parser;
use std::path::PathBuf;

// Clip probe backend
const CLIP_PROBE: &str = "FFmpeg (playa-ffmpeg)";

// Build version with backend info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Clip probe: ", CLIP_PROBE, "\n",
    "Target:     ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Radar frame loop viewer
///
/// Fetches the frame manifest, then steps through frames with
/// `n`/`l` (next) and `p`/`h` (previous); `q` quits.
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Manifest URL (overrides settings)
    #[arg(short = 'm', long = "manifest-url", value_name = "URL")]
    pub manifest_url: Option<String>,

    /// Frame base URL; frame names are appended to it (overrides settings)
    #[arg(short = 'b', long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Frame cache directory (overrides settings and platform default)
    #[arg(long = "cache-dir", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Worker threads (0 = auto)
    #[arg(long = "workers", value_name = "N")]
    pub workers: Option<u32>,

    /// Write the effective settings to the settings file
    #[arg(long = "save-settings")]
    pub save_settings: bool,

    /// Serve a frame directory instead of viewing (manifest + frames over HTTP)
    #[arg(long = "serve", value_name = "DIR")]
    pub serve: Option<PathBuf>,

    /// Port for --serve
    #[arg(long = "port", value_name = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Enable debug logging to file (default: radarloop.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}
