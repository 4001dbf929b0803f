//! Test doubles shared by the core test modules.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::entities::{FetchError, HttpSource, Renderer, WorkerPool};

enum Canned {
    Body(Vec<u8>),
    Status(u16),
}

/// In-memory origin: canned responses per URL plus request counting.
#[derive(Default)]
pub struct FakeOrigin {
    responses: Mutex<HashMap<String, Canned>>,
    counts: Mutex<HashMap<String, usize>>,
}

impl FakeOrigin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: &str, body: Vec<u8>) {
        self.responses.lock().unwrap().insert(url.to_string(), Canned::Body(body));
    }

    pub fn fail(&self, url: &str, code: u16) {
        self.responses.lock().unwrap().insert(url.to_string(), Canned::Status(code));
    }

    pub fn requests(&self, url: &str) -> usize {
        self.counts.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_requests(&self) -> usize {
        self.counts.lock().unwrap().values().sum()
    }
}

impl HttpSource for FakeOrigin {
    fn get(&self, url: &str) -> Result<Box<dyn Read + Send>, FetchError> {
        *self.counts.lock().unwrap().entry(url.to_string()).or_default() += 1;
        match self.responses.lock().unwrap().get(url) {
            Some(Canned::Body(body)) => Ok(Box::new(Cursor::new(body.clone()))),
            Some(Canned::Status(code)) => Err(FetchError::Status {
                url: url.to_string(),
                code: *code,
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                code: 404,
            }),
        }
    }
}

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Pool that holds jobs until the test runs them, in any order.
///
/// Ignores epochs on purpose so stale results reach the controller.
#[derive(Default)]
pub struct ManualPool {
    jobs: Mutex<Vec<Job>>,
}

impl ManualPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    /// Run the job at `index` in submission order.
    pub fn run(&self, index: usize) {
        let job = self.jobs.lock().unwrap().remove(index);
        job();
    }

    /// Run everything queued so far, oldest first.
    pub fn run_all(&self) {
        let jobs: Vec<Job> = std::mem::take(&mut *self.jobs.lock().unwrap());
        for job in jobs {
            job();
        }
    }
}

impl WorkerPool for ManualPool {
    fn execute(&self, f: Job) {
        self.jobs.lock().unwrap().push(f);
    }

    fn execute_with_epoch(&self, _epoch: u64, f: Job) {
        self.jobs.lock().unwrap().push(f);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Clip(PathBuf),
    Still(PathBuf),
}

impl Rendered {
    pub fn file_name(&self) -> String {
        let path = match self {
            Rendered::Clip(p) | Rendered::Still(p) => p,
        };
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Renderer that records every call; clones share the log.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    calls: Arc<Mutex<Vec<Rendered>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Rendered> {
        self.calls.lock().unwrap().clone()
    }
}

impl Renderer for RecordingRenderer {
    fn play_clip(&mut self, path: &Path) {
        self.calls.lock().unwrap().push(Rendered::Clip(path.to_path_buf()));
    }

    fn draw_still(&mut self, path: &Path) {
        self.calls.lock().unwrap().push(Rendered::Still(path.to_path_buf()));
    }
}

/// A tiny lossless WebP image.
pub fn webp_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 120, 0, 255]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::WebP)
        .unwrap();
    out.into_inner()
}

/// One-frame 4x4 clip: `ftyp`, `moov` with a single `vide` track, `mdat`.
pub fn clip_bytes() -> Vec<u8> {
    include_bytes!("../../tests/fixtures/clip.mp4").to_vec()
}

/// Same clip as written by QuickTime tools: a `wide` box ahead of `ftyp`
/// and a few padding bytes after `mdat`.
pub fn wide_padded_clip_bytes() -> Vec<u8> {
    include_bytes!("../../tests/fixtures/clip_wide_padded.mp4").to_vec()
}

/// Valid MP4 holding only a PCM sound track.
pub fn audio_only_bytes() -> Vec<u8> {
    include_bytes!("../../tests/fixtures/audio_only.mp4").to_vec()
}
