//! Abstract traits for dependency inversion.
//!
//! These traits define what the pipeline needs from the platform and from
//! infrastructure, so `core` can be driven by fakes in tests.
//!
//! Implementations live in `core/` (HTTP, workers) and `console`.

use std::io::Read;
use std::path::Path;

use super::error::FetchError;

/// Drawing surface for resolved frames.
///
/// The controller calls exactly one of these per successfully resolved
/// current frame. Implementations own their own failure handling.
pub trait Renderer {
    /// Play a cached MP4 clip.
    fn play_clip(&mut self, path: &Path);

    /// Draw a cached WebP still.
    fn draw_still(&mut self, path: &Path);
}

/// Single GET against the origin.
pub trait HttpSource: Send + Sync {
    /// Issue one GET and hand back the body as a stream.
    ///
    /// Non-success statuses are errors; there is no retry.
    fn get(&self, url: &str) -> Result<Box<dyn Read + Send>, FetchError>;
}

/// Abstract worker pool interface.
///
/// Allows the controller to push background work without knowing
/// the concrete pool implementation.
pub trait WorkerPool: Send + Sync {
    /// Run job on a worker thread.
    fn execute(&self, f: Box<dyn FnOnce() + Send + 'static>);

    /// Run job only if `epoch` is still current when a worker picks it up.
    fn execute_with_epoch(&self, epoch: u64, f: Box<dyn FnOnce() + Send + 'static>);
}
