//! Frame origin server - publishes a frame directory over HTTP.
//!
//! Counterpart of the viewer: it speaks the same manifest + frame protocol,
//! so a directory of produced frames can be viewed without other hosting.
//!
//! - **rouille** - sync HTTP server, one handler closure
//!
//! # Endpoints
//!
//! | Method | Path             | Description                                  |
//! |--------|------------------|----------------------------------------------|
//! | GET    | `/radar.php`     | Manifest listing (text/plain, one per line)  |
//! | GET    | `/manifest`      | Same listing                                 |
//! | GET    | `/radar/{name}`  | Frame bytes (`image/webp` or `video/mp4`)    |

pub mod listing;

use chrono::NaiveDateTime;
use log::{debug, info, warn};
use rouille::{Request, Response};
use std::fs::File;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use crate::entities::FrameId;
pub use listing::{manifest_listing, render_listing};

/// Clock used to pick the current hour's stills.
pub type Clock = fn() -> NaiveDateTime;

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Serves manifest and frames out of `root`.
#[derive(Debug, Clone)]
pub struct FrameServer {
    root: PathBuf,
    clock: Clock,
}

/// Handle to a server running on a background thread.
pub struct RunningServer {
    pub addr: SocketAddr,
    stop: mpsc::Sender<()>,
    handle: thread::JoinHandle<()>,
}

impl RunningServer {
    /// Base URL of the running server, e.g. `http://127.0.0.1:8080`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop accepting requests and join the server thread.
    pub fn stop(self) {
        let _ = self.stop.send(());
        let _ = self.handle.join();
    }
}

impl FrameServer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            clock: local_now,
        }
    }

    /// Replace the wall clock (tests, replaying old directories).
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Serve forever on `addr` (blocks the calling thread).
    pub fn run(self, addr: &str) -> ! {
        info!("Frame server on http://{} serving {}", addr, self.root.display());
        rouille::start_server(addr, move |request| self.handle(request))
    }

    /// Serve on `addr` from a background thread. Port 0 picks a free port.
    pub fn spawn(self, addr: &str) -> anyhow::Result<RunningServer> {
        let server = rouille::Server::new(addr, move |request| self.handle(request))
            .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;
        let addr = server.server_addr();
        info!("Frame server listening on http://{}", addr);
        let (handle, stop) = server.stoppable();
        Ok(RunningServer { addr, stop, handle })
    }

    pub fn handle(&self, request: &Request) -> Response {
        if request.method() != "GET" {
            return Response::empty_406();
        }
        let url = request.url();
        debug!("GET {}", url);

        match url.as_str() {
            "/radar.php" | "/manifest" => self.manifest(),
            path => match path.strip_prefix("/radar/") {
                Some(name) => self.frame(name),
                None => Response::empty_404(),
            },
        }
    }

    fn manifest(&self) -> Response {
        match manifest_listing(&self.root, (self.clock)()) {
            Ok(names) => Response::text(render_listing(&names)),
            Err(e) => {
                warn!("Listing {} failed: {}", self.root.display(), e);
                Response::text("listing failed\n").with_status_code(500)
            }
        }
    }

    fn frame(&self, name: &str) -> Response {
        let id = FrameId::from(name);
        let (true, Some(kind)) = (id.is_plain_name(), id.kind()) else {
            return Response::empty_404();
        };
        match File::open(self.root.join(name)) {
            Ok(file) => Response::from_file(kind.mime_type(), file),
            Err(_) => Response::empty_404(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{clip_bytes, webp_bytes};
    use crate::core::{CacheValidator, FrameStore, HttpClient, ManifestFetcher};
    use crate::entities::{FetchError, FrameKind, HttpSource};
    use chrono::NaiveDate;
    use std::fs;
    use std::sync::Arc;

    fn fixed_clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 19)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    fn frames_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("0619_13.mp4"), clip_bytes()).unwrap();
        fs::write(dir.path().join("0619_1405.webp"), webp_bytes()).unwrap();
        fs::write(dir.path().join("0619_1200.webp"), webp_bytes()).unwrap();
        dir
    }

    #[test]
    fn test_manifest_and_frames_over_http() {
        let frames = frames_dir();
        let server = FrameServer::new(frames.path())
            .with_clock(fixed_clock)
            .spawn("127.0.0.1:0")
            .unwrap();
        let http: Arc<HttpClient> = Arc::new(HttpClient::default());

        let manifest = ManifestFetcher::new(http.clone())
            .fetch(&format!("{}/radar.php", server.url()))
            .unwrap();
        let names: Vec<&str> = manifest.iter().map(|id| id.as_str()).collect();
        assert_eq!(names, vec!["0619_13.mp4", "0619_1405.webp", ""]);

        let cache = tempfile::tempdir().unwrap();
        let store = FrameStore::new(cache.path(), http);
        let base = format!("{}/radar/", server.url());
        for id in manifest.iter().filter(|id| !id.is_empty()) {
            let path = store.resolve(id, &base).unwrap();
            assert!(CacheValidator::is_valid(&path, id.kind()));
        }
        assert_eq!(store.stats().downloads(), 2);

        server.stop();
    }

    #[test]
    fn test_missing_and_unsafe_frames_are_404() {
        let frames = frames_dir();
        let server = FrameServer::new(frames.path()).spawn("127.0.0.1:0").unwrap();
        let http = HttpClient::default();

        for path in ["/radar/0101_0000.webp", "/radar/..%2Fsecret.webp", "/radar/notes.txt", "/elsewhere"] {
            match http.get(&format!("{}{}", server.url(), path)) {
                Err(FetchError::Status { code, .. }) => assert_eq!(code, 404, "{}", path),
                other => panic!("expected 404 for {}, got {:?}", path, other.map(|_| ())),
            }
        }
        server.stop();
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(FrameKind::Still.mime_type(), "image/webp");
        assert_eq!(FrameKind::Clip.mime_type(), "video/mp4");
    }
}
