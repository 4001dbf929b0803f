//! Cache validation - does a file on disk structurally match its frame kind
//!
//! Stills: header-only decode, detected format must be WebP.
//! Clips: FFmpeg opens the container, which must carry a video stream.
//!
//! Any error while checking means "not valid" - the caller treats that as a
//! cache miss and downloads again.

use image::{ImageFormat, ImageReader};
use log::{debug, warn};
use playa_ffmpeg as ffmpeg;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Once;

use crate::entities::FrameKind;

/// Stateless validator; only reads the file it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheValidator;

impl CacheValidator {
    /// Whether the file at `path` is a usable `kind` frame.
    ///
    /// `None` (unrecognised suffix) is never valid.
    pub fn is_valid(path: &Path, kind: Option<FrameKind>) -> bool {
        let verdict = match kind {
            Some(FrameKind::Still) => check_still(path),
            Some(FrameKind::Clip) => check_clip(path),
            None => Err("no frame kind".to_string()),
        };
        match verdict {
            Ok(valid) => valid,
            Err(reason) => {
                debug!("Validation failed for {}: {}", path.display(), reason);
                false
            }
        }
    }
}

fn check_still(path: &Path) -> Result<bool, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    // Guess from content only, never from the file extension
    let reader = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(|e| e.to_string())?;
    if reader.format() != Some(ImageFormat::WebP) {
        return Ok(false);
    }
    reader.into_dimensions().map_err(|e| e.to_string())?;
    Ok(true)
}

static FFMPEG_INIT: Once = Once::new();

fn init_ffmpeg() {
    FFMPEG_INIT.call_once(|| {
        if let Err(e) = ffmpeg::init() {
            warn!("FFmpeg init failed: {}", e);
        }
        // Probe failures are expected on bad downloads; keep stderr quiet
        ffmpeg::util::log::set_level(ffmpeg::util::log::Level::Quiet);
    });
}

fn check_clip(path: &Path) -> Result<bool, String> {
    init_ffmpeg();
    // Input context is dropped (and the file closed) when this scope ends
    let ictx = ffmpeg::format::input(path).map_err(|e| format!("Failed to open clip: {}", e))?;
    let demuxer = ictx.format().name().to_string();
    if !demuxer.split(',').any(|name| name == "mp4") {
        return Err(format!("not an MP4 container ({})", demuxer));
    }
    Ok(ictx.streams().best(ffmpeg::media::Type::Video).is_some())
}
