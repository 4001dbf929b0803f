//! RADARLOOP - Radar frame loop viewer library
//!
//! Re-exports all modules for use by binary targets.

// Core engine (controller, cache, workers, http)
pub mod core;

// App modules
pub mod cli;
pub mod console;
pub mod entities;
pub mod paths;
pub mod server;
pub mod settings;

// Re-export commonly used types from core
pub use crate::core::controller::{Endpoints, FrameController, Navigation, Phase};
pub use crate::core::epoch::Epoch;
pub use crate::core::frame_store::{FrameStore, StoreStats};
pub use crate::core::http::HttpClient;
pub use crate::core::manifest::ManifestFetcher;
pub use crate::core::validate::CacheValidator;
pub use crate::core::workers::Workers;

// Re-export entities
pub use entities::{FetchError, FrameId, FrameKind, HttpSource, Manifest, PlaybackCursor, Renderer, WorkerPool};
