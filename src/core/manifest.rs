//! Manifest fetch - one GET, newline separated frame names

use log::{info, warn};
use std::io::Read;
use std::sync::Arc;

use crate::entities::{FetchError, HttpSource, Manifest};

/// Largest manifest body accepted (same cap as ureq's `into_string`)
pub const MAX_MANIFEST_BYTES: u64 = 10 * 1024 * 1024;

/// Retrieves the ordered frame list from the manifest endpoint.
#[derive(Clone)]
pub struct ManifestFetcher {
    http: Arc<dyn HttpSource>,
    max_bytes: u64,
}

impl ManifestFetcher {
    pub fn new(http: Arc<dyn HttpSource>) -> Self {
        Self {
            http,
            max_bytes: MAX_MANIFEST_BYTES,
        }
    }

    /// Override the body size cap.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Fetch and parse the manifest at `endpoint`.
    ///
    /// Exactly one request, no retry. The body must be UTF-8.
    pub fn fetch(&self, endpoint: &str) -> Result<Manifest, FetchError> {
        info!("Fetching manifest from {}", endpoint);

        let mut body = Vec::new();
        self.http
            .get(endpoint)
            .inspect_err(|e| warn!("Manifest request failed: {}", e))?
            // One byte past the cap tells an oversized body from an exact fit
            .take(self.max_bytes.saturating_add(1))
            .read_to_end(&mut body)
            .map_err(|e| FetchError::Body {
                url: endpoint.to_string(),
                reason: e.to_string(),
            })?;
        if body.len() as u64 > self.max_bytes {
            warn!("Manifest from {} exceeds {} bytes", endpoint, self.max_bytes);
            return Err(FetchError::Body {
                url: endpoint.to_string(),
                reason: format!("manifest larger than {} bytes", self.max_bytes),
            });
        }

        let text = String::from_utf8(body).map_err(|e| FetchError::Body {
            url: endpoint.to_string(),
            reason: format!("manifest is not UTF-8: {}", e),
        })?;

        let manifest = Manifest::parse(&text);
        info!("Manifest: {} frame(s)", manifest.len());
        Ok(manifest)
    }
}
