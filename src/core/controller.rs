//! Frame controller - owns the cursor and turns navigation into rendered frames
//!
//! **Threading**: the controller lives on the foreground (input/render) thread.
//! Manifest fetch and frame resolve run on the worker pool and report back
//! through a channel; `poll()` applies those results on the foreground, so
//! the cursor is never touched from a worker.
//!
//! # Stale results
//!
//! Every frame request gets a fresh epoch. Workers skip queued jobs whose
//! epoch has moved on, and `apply` drops any completed result that is not the
//! live request. Only the most recently requested frame is ever rendered;
//! intermediate frames passed during fast navigation may never be.
//!
//! # Failure
//!
//! Nothing here panics on a fetch failure. A failed manifest leaves the
//! controller `Unavailable` with an empty cursor; a failed frame leaves the
//! display as it was and the cursor where the user put it.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::epoch::Epoch;
use super::frame_store::FrameStore;
use super::manifest::ManifestFetcher;
use crate::entities::{FetchError, FrameId, FrameKind, Manifest, PlaybackCursor, Renderer, WorkerPool};

/// Discrete navigation input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Previous,
}

/// Controller lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// `start()` not called yet
    Idle,
    /// Manifest request in flight
    LoadingManifest,
    /// Manifest applied (possibly empty)
    Ready,
    /// Manifest fetch failed; `start()` may be called again
    Unavailable,
}

/// Token for one frame resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRequest {
    pub epoch: u64,
    pub index: usize,
    pub id: FrameId,
}

/// Completed background work, applied on the foreground by `poll()`.
#[derive(Debug)]
pub enum WorkResult {
    Manifest(Result<Manifest, FetchError>),
    Frame {
        request: FrameRequest,
        result: Result<PathBuf, FetchError>,
    },
}

/// Origin URLs.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Manifest listing URL
    pub manifest_url: String,
    /// Prefix for frame URLs (`base_url + frame name`)
    pub base_url: String,
}

pub struct FrameController {
    endpoints: Endpoints,
    manifests: ManifestFetcher,
    store: Arc<FrameStore>,
    pool: Arc<dyn WorkerPool>,
    epoch: Epoch,
    cursor: PlaybackCursor,
    phase: Phase,
    pending: Option<FrameRequest>,
    surface: Option<Box<dyn Renderer>>,
    tx: Sender<WorkResult>,
    rx: Receiver<WorkResult>,
}

impl FrameController {
    /// `epoch` must be the one shared with `pool` for queued-job skipping.
    pub fn new(
        endpoints: Endpoints,
        manifests: ManifestFetcher,
        store: Arc<FrameStore>,
        pool: Arc<dyn WorkerPool>,
        epoch: Epoch,
    ) -> Self {
        let (tx, rx) = unbounded();
        Self {
            endpoints,
            manifests,
            store,
            pool,
            epoch,
            cursor: PlaybackCursor::empty(),
            phase: Phase::Idle,
            pending: None,
            surface: None,
            tx,
            rx,
        }
    }

    // === Queries ===

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cursor(&self) -> &PlaybackCursor {
        &self.cursor
    }

    pub fn current(&self) -> Option<&FrameId> {
        self.cursor.current()
    }

    pub fn index(&self) -> Option<usize> {
        self.cursor.index()
    }

    pub fn manifest(&self) -> &Arc<Manifest> {
        self.cursor.manifest()
    }

    /// Frame request still waiting for its result.
    pub fn pending(&self) -> Option<&FrameRequest> {
        self.pending.as_ref()
    }

    pub fn store(&self) -> &Arc<FrameStore> {
        &self.store
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    // === Lifecycle ===

    /// Kick off the manifest fetch.
    ///
    /// Returns false if a manifest is already loading or loaded.
    pub fn start(&mut self) -> bool {
        if matches!(self.phase, Phase::LoadingManifest | Phase::Ready) {
            return false;
        }
        self.phase = Phase::LoadingManifest;

        let manifests = self.manifests.clone();
        let url = self.endpoints.manifest_url.clone();
        let tx = self.tx.clone();
        self.pool.execute(Box::new(move || {
            let _ = tx.send(WorkResult::Manifest(manifests.fetch(&url)));
        }));
        true
    }

    /// Render target became available; show the current frame on it.
    pub fn surface_ready(&mut self, renderer: Box<dyn Renderer>) {
        debug!("Surface ready");
        self.surface = Some(renderer);
        self.request_current();
    }

    /// Render target torn down; results arriving until the next
    /// `surface_ready` are dropped.
    pub fn surface_destroyed(&mut self) {
        if self.surface.take().is_some() {
            debug!("Surface destroyed");
        }
    }

    /// Move the cursor and request the frame under it.
    ///
    /// At either end the cursor stays put and the same frame is requested
    /// again.
    pub fn navigate(&mut self, nav: Navigation) {
        if self.phase != Phase::Ready {
            debug!("Ignoring {:?}: manifest not ready ({:?})", nav, self.phase);
            return;
        }
        let moved = match nav {
            Navigation::Next => self.cursor.advance(),
            Navigation::Previous => self.cursor.retreat(),
        };
        if moved.is_none() {
            return;
        }
        info!("{:?} -> index {:?}", nav, self.cursor.index());
        self.request_current();
    }

    // === Result handling ===

    /// Apply all completed work without blocking. Returns how many results
    /// were applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(result) = self.rx.try_recv() {
            self.apply(result);
            applied += 1;
        }
        applied
    }

    /// Wait up to `timeout` for at least one result, then drain the rest.
    pub fn poll_timeout(&mut self, timeout: Duration) -> usize {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => {
                self.apply(result);
                1 + self.poll()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    fn apply(&mut self, result: WorkResult) {
        match result {
            WorkResult::Manifest(Ok(manifest)) => {
                self.cursor = PlaybackCursor::new(Arc::new(manifest));
                self.phase = Phase::Ready;
                self.request_current();
            }
            WorkResult::Manifest(Err(e)) => {
                warn!("Manifest unavailable: {}", e);
                self.cursor = PlaybackCursor::empty();
                self.phase = Phase::Unavailable;
            }
            WorkResult::Frame { request, result } => {
                if !self.is_live(&request) {
                    debug!("Dropping stale result for {} (epoch {})", request.id, request.epoch);
                    return;
                }
                self.pending = None;
                match result {
                    Ok(path) => self.render(&request.id, &path),
                    Err(e) => warn!("Not showing {}: {}", request.id, e),
                }
            }
        }
    }

    fn is_live(&self, request: &FrameRequest) -> bool {
        self.pending.as_ref() == Some(request)
            && request.epoch == self.epoch.current()
            && self.cursor.index() == Some(request.index)
    }

    fn request_current(&mut self) {
        if self.phase != Phase::Ready {
            return;
        }
        let (Some(index), Some(id)) = (self.cursor.index(), self.cursor.current().cloned()) else {
            debug!("Manifest empty, nothing to show");
            return;
        };

        let request = FrameRequest {
            epoch: self.epoch.increment(),
            index,
            id,
        };
        self.pending = Some(request.clone());

        let store = Arc::clone(&self.store);
        let base_url = self.endpoints.base_url.clone();
        let tx = self.tx.clone();
        let epoch = request.epoch;
        self.pool.execute_with_epoch(
            epoch,
            Box::new(move || {
                let result = store.resolve(&request.id, &base_url);
                let _ = tx.send(WorkResult::Frame { request, result });
            }),
        );
    }

    fn render(&mut self, id: &FrameId, path: &Path) {
        let Some(surface) = self.surface.as_mut() else {
            debug!("Render target unavailable, dropping {}", id);
            return;
        };
        match id.kind() {
            Some(FrameKind::Clip) => surface.play_clip(path),
            Some(FrameKind::Still) => surface.draw_still(path),
            None => debug!("No renderer for {}", id),
        }
    }
}
