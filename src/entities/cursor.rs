//! Playback cursor - the "current frame" pointer into a manifest
//!
//! Clamps at both ends, no wraparound. Stepping past an end leaves the index
//! where it is but still reports the frame there, so the caller can re-render
//! it the same way a swipe past the last frame re-displays it.

use std::sync::Arc;

use super::frame::{FrameId, Manifest};

/// Manifest reference plus current index.
///
/// Invariant: `index < manifest.len()` whenever the manifest is non-empty.
/// With an empty manifest there is no current frame.
#[derive(Debug, Clone, Default)]
pub struct PlaybackCursor {
    manifest: Arc<Manifest>,
    index: usize,
}

impl PlaybackCursor {
    /// Cursor at the first frame of `manifest`.
    pub fn new(manifest: Arc<Manifest>) -> Self {
        Self { manifest, index: 0 }
    }

    /// Cursor with no frames (manifest not loaded or unavailable).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn manifest(&self) -> &Arc<Manifest> {
        &self.manifest
    }

    pub fn len(&self) -> usize {
        self.manifest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifest.is_empty()
    }

    /// Current index, `None` when the manifest is empty.
    pub fn index(&self) -> Option<usize> {
        (!self.manifest.is_empty()).then_some(self.index)
    }

    pub fn current(&self) -> Option<&FrameId> {
        self.manifest.get(self.index)
    }

    /// Step forward, clamping at the last frame.
    pub fn advance(&mut self) -> Option<&FrameId> {
        let last = self.manifest.len().checked_sub(1)?;
        self.index = (self.index + 1).min(last);
        self.current()
    }

    /// Step back, clamping at the first frame.
    pub fn retreat(&mut self) -> Option<&FrameId> {
        if self.manifest.is_empty() {
            return None;
        }
        self.index = self.index.saturating_sub(1);
        self.current()
    }
}
