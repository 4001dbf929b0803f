//! Blocking HTTP(S) client for the origin, built on `ureq`.

use log::trace;
use std::io::Read;
use std::time::Duration;

use crate::entities::{FetchError, HttpSource};

/// Connect timeout used when settings do not override it
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Read timeout used when settings do not override it
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared GET client. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT)
    }
}

impl HttpClient {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(connect_timeout)
            .timeout_read(read_timeout)
            .user_agent(concat!("radarloop/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }
}

/// Reject anything that is not an absolute http(s) URL before touching the network.
pub fn check_url(url: &str) -> Result<(), FetchError> {
    let lower = url.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .ok_or_else(|| FetchError::BadUrl(url.to_string()))?;
    if rest.is_empty() || rest.starts_with('/') {
        return Err(FetchError::BadUrl(url.to_string()));
    }
    Ok(())
}

impl HttpSource for HttpClient {
    fn get(&self, url: &str) -> Result<Box<dyn Read + Send>, FetchError> {
        check_url(url)?;
        trace!("GET {}", url);
        match self.agent.get(url).call() {
            Ok(resp) => Ok(Box::new(resp.into_reader())),
            Err(ureq::Error::Status(code, _)) => Err(FetchError::Status {
                url: url.to_string(),
                code,
            }),
            Err(ureq::Error::Transport(t)) => Err(FetchError::Transport {
                url: url.to_string(),
                reason: t.to_string(),
            }),
        }
    }
}
