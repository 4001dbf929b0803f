use std::path::PathBuf;

/// Failure to obtain a manifest or a frame from the origin.
///
/// Never fatal: the controller logs it and leaves the display as it was.
#[derive(Debug)]
pub enum FetchError {
    /// Endpoint is not an absolute http(s) URL
    BadUrl(String),
    /// Origin answered with a non-success status
    Status { url: String, code: u16 },
    /// Connection, TLS or timeout failure
    Transport { url: String, reason: String },
    /// Response body could not be read or decoded
    Body { url: String, reason: String },
    /// Local cache I/O failure
    Io { path: PathBuf, source: std::io::Error },
    /// Identifier cannot name a cache entry (empty, path-like, unknown suffix)
    InvalidId(String),
    /// Downloaded bytes did not validate as the expected kind
    Invalid { id: String },
}

impl FetchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::Io {
            path: path.into(),
            source,
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::BadUrl(url) => write!(f, "Not an http(s) URL: {}", url),
            FetchError::Status { url, code } => write!(f, "HTTP {} from {}", code, url),
            FetchError::Transport { url, reason } => {
                write!(f, "Request to {} failed: {}", url, reason)
            }
            FetchError::Body { url, reason } => {
                write!(f, "Failed to read response from {}: {}", url, reason)
            }
            FetchError::Io { path, source } => {
                write!(f, "Cache I/O error at {}: {}", path.display(), source)
            }
            FetchError::InvalidId(id) => write!(f, "Invalid frame identifier: {:?}", id),
            FetchError::Invalid { id } => write!(f, "Downloaded frame {} failed validation", id),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
