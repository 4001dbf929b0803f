//! Frame store - on-disk cache of frame files keyed by frame name
//!
//! Layout: `<cache_dir>/<frame name>`, one file per frame, stable across runs.
//!
//! Resolve order:
//! 1. Cached file exists and validates for its kind -> use it, no network
//! 2. Otherwise one GET of `base_url + name`, streamed in fixed-size chunks to
//!    a temp file in the cache dir, validated, then renamed over the entry
//!
//! The rename is the only way an entry becomes visible, so an interrupted or
//! bad download never leaves a half-written file under the frame's name.

use log::{debug, info, warn};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::validate::CacheValidator;
use crate::entities::{FetchError, FrameId, FrameKind, HttpSource};

/// Download buffer size
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Cache counters for monitoring
#[derive(Debug, Default)]
pub struct StoreStats {
    hits: AtomicU64,
    misses: AtomicU64,
    downloads: AtomicU64,
    failures: AtomicU64,
}

impl StoreStats {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Completed downloads (validated and installed)
    pub fn downloads(&self) -> u64 {
        self.downloads.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits() + self.misses();
        if total == 0 { 0.0 } else { self.hits() as f64 / total as f64 }
    }
}

/// Local frame cache backed by an origin.
pub struct FrameStore {
    cache_dir: PathBuf,
    http: Arc<dyn HttpSource>,
    stats: StoreStats,
}

impl FrameStore {
    pub fn new(cache_dir: impl Into<PathBuf>, http: Arc<dyn HttpSource>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            http,
            stats: StoreStats::default(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    /// Deterministic cache location of `id`.
    pub fn cache_path(&self, id: &FrameId) -> Result<PathBuf, FetchError> {
        if !id.is_plain_name() {
            return Err(FetchError::InvalidId(id.to_string()));
        }
        Ok(self.cache_dir.join(id.as_str()))
    }

    /// Drop the cached entry for `id`, if any.
    pub fn remove(&self, id: &FrameId) -> Result<bool, FetchError> {
        let path = self.cache_path(id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FetchError::io(path, e)),
        }
    }

    /// Local path of a validated copy of `id`, downloading it if needed.
    pub fn resolve(&self, id: &FrameId, base_url: &str) -> Result<PathBuf, FetchError> {
        let path = self.cache_path(id)?;
        let kind = id.kind().ok_or_else(|| FetchError::InvalidId(id.to_string()))?;

        if path.is_file() {
            if CacheValidator::is_valid(&path, Some(kind)) {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache hit: {}", path.display());
                return Ok(path);
            }
            debug!("Cached {} failed validation, downloading again", id);
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);

        let url = format!("{}{}", base_url, id);
        match self.download(id, kind, &url, &path) {
            Ok(()) => {
                self.stats.downloads.fetch_add(1, Ordering::Relaxed);
                info!("Downloaded {} -> {}", url, path.display());
                Ok(path)
            }
            Err(e) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                warn!("Download of {} failed: {}", url, e);
                Err(e)
            }
        }
    }

    fn download(&self, id: &FrameId, kind: FrameKind, url: &str, path: &Path) -> Result<(), FetchError> {
        fs::create_dir_all(&self.cache_dir).map_err(|e| FetchError::io(&self.cache_dir, e))?;

        let mut body = self.http.get(url)?;

        // Temp file lives next to the entry so the final rename stays on one filesystem.
        // Dropped (and deleted) on every early return below.
        let mut part = tempfile::Builder::new()
            .prefix(".")
            .suffix(".part")
            .tempfile_in(&self.cache_dir)
            .map_err(|e| FetchError::io(&self.cache_dir, e))?;

        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let n = match body.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(FetchError::Body {
                        url: url.to_string(),
                        reason: e.to_string(),
                    });
                }
            };
            part.write_all(&buf[..n])
                .map_err(|e| FetchError::io(part.path(), e))?;
        }
        part.as_file()
            .sync_all()
            .map_err(|e| FetchError::io(part.path(), e))?;

        if !CacheValidator::is_valid(part.path(), Some(kind)) {
            return Err(FetchError::Invalid { id: id.to_string() });
        }

        part.persist(path).map_err(|e| FetchError::io(path, e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{FakeOrigin, clip_bytes, webp_bytes, wide_padded_clip_bytes};

    const BASE: &str = "https://origin.test/radar/";

    fn setup() -> (tempfile::TempDir, Arc<FakeOrigin>, FrameStore) {
        let dir = tempfile::tempdir().unwrap();
        let origin = Arc::new(FakeOrigin::new());
        let store = FrameStore::new(dir.path().join("frames"), origin.clone());
        (dir, origin, store)
    }

    fn leftover_parts(store: &FrameStore) -> usize {
        fs::read_dir(store.cache_dir())
            .map(|it| {
                it.filter_map(Result::ok)
                    .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
                    .count()
            })
            .unwrap_or(0)
    }

    #[test]
    fn test_second_resolve_is_served_from_cache() {
        let (_dir, origin, store) = setup();
        origin.serve(&format!("{BASE}a.webp"), webp_bytes());
        let id = FrameId::from("a.webp");

        let first = store.resolve(&id, BASE).unwrap();
        let second = store.resolve(&id, BASE).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, store.cache_dir().join("a.webp"));
        assert_eq!(origin.requests(&format!("{BASE}a.webp")), 1);
        assert_eq!(store.stats().hits(), 1);
        assert_eq!(store.stats().misses(), 1);
        assert_eq!(store.stats().downloads(), 1);
    }

    #[test]
    fn test_cache_survives_new_store() {
        let (dir, origin, store) = setup();
        origin.serve(&format!("{BASE}b.mp4"), clip_bytes());
        let id = FrameId::from("b.mp4");
        store.resolve(&id, BASE).unwrap();

        let reopened = FrameStore::new(dir.path().join("frames"), origin.clone());
        reopened.resolve(&id, BASE).unwrap();
        assert_eq!(origin.requests(&format!("{BASE}b.mp4")), 1);
    }

    #[test]
    fn test_invalid_cached_file_is_refetched_once() {
        let (_dir, origin, store) = setup();
        let url = format!("{BASE}c.webp");
        origin.serve(&url, webp_bytes());
        fs::create_dir_all(store.cache_dir()).unwrap();
        let path = store.cache_dir().join("c.webp");
        fs::write(&path, b"").unwrap();

        let resolved = store.resolve(&FrameId::from("c.webp"), BASE).unwrap();

        assert_eq!(resolved, path);
        assert_eq!(origin.requests(&url), 1);
        assert_eq!(fs::read(&path).unwrap(), webp_bytes());
        assert!(CacheValidator::is_valid(&path, Some(FrameKind::Still)));
    }

    #[test]
    fn test_zero_length_clip_is_refetched() {
        let (_dir, origin, store) = setup();
        let url = format!("{BASE}d.mp4");
        origin.serve(&url, clip_bytes());
        fs::create_dir_all(store.cache_dir()).unwrap();
        fs::write(store.cache_dir().join("d.mp4"), b"").unwrap();

        store.resolve(&FrameId::from("d.mp4"), BASE).unwrap();
        assert_eq!(origin.requests(&url), 1);
    }

    #[test]
    fn test_quicktime_style_clip_is_installed_and_reused() {
        let (_dir, origin, store) = setup();
        let url = format!("{BASE}0619_13.mp4");
        origin.serve(&url, wide_padded_clip_bytes());
        let id = FrameId::from("0619_13.mp4");

        let path = store.resolve(&id, BASE).unwrap();
        store.resolve(&id, BASE).unwrap();

        assert_eq!(fs::read(&path).unwrap(), wide_padded_clip_bytes());
        assert_eq!(origin.requests(&url), 1);
        assert_eq!(store.stats().hits(), 1);
    }

    #[test]
    fn test_bad_download_is_not_installed() {
        let (_dir, origin, store) = setup();
        let url = format!("{BASE}e.webp");
        origin.serve(&url, b"not an image".to_vec());
        let id = FrameId::from("e.webp");

        assert!(matches!(store.resolve(&id, BASE), Err(FetchError::Invalid { .. })));
        assert!(!store.cache_dir().join("e.webp").exists());
        assert_eq!(leftover_parts(&store), 0);
        assert_eq!(store.stats().failures(), 1);
    }

    #[test]
    fn test_failed_download_keeps_previous_entry() {
        let (_dir, origin, store) = setup();
        let url = format!("{BASE}f.webp");
        origin.fail(&url, 404);
        fs::create_dir_all(store.cache_dir()).unwrap();
        let path = store.cache_dir().join("f.webp");
        fs::write(&path, b"garbage").unwrap();

        assert!(matches!(
            store.resolve(&FrameId::from("f.webp"), BASE),
            Err(FetchError::Status { code: 404, .. })
        ));
        assert_eq!(fs::read(&path).unwrap(), b"garbage");
        assert_eq!(leftover_parts(&store), 0);
    }

    #[test]
    fn test_invalid_ids_never_hit_network() {
        let (_dir, origin, store) = setup();
        for name in ["", "..", "../x.webp", "a/b.webp", "notes.txt"] {
            assert!(matches!(
                store.resolve(&FrameId::from(name), BASE),
                Err(FetchError::InvalidId(_))
            ));
        }
        assert_eq!(origin.total_requests(), 0);
    }

    #[test]
    fn test_remove() {
        let (_dir, origin, store) = setup();
        origin.serve(&format!("{BASE}g.webp"), webp_bytes());
        let id = FrameId::from("g.webp");
        store.resolve(&id, BASE).unwrap();

        assert!(store.remove(&id).unwrap());
        assert!(!store.remove(&id).unwrap());
        store.resolve(&id, BASE).unwrap();
        assert_eq!(origin.requests(&format!("{BASE}g.webp")), 2);
    }
}
