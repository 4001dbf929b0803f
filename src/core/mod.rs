//! Core pipeline modules - fetch, cache, validate, schedule, control
//!
//! These modules form the frame pipeline, independent of any UI.

pub mod controller;
pub mod epoch;
pub mod frame_store;
pub mod http;
pub mod manifest;
pub mod validate;
pub mod workers;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use controller::{Endpoints, FrameController, FrameRequest, Navigation, Phase, WorkResult};
pub use epoch::Epoch;
pub use frame_store::{FrameStore, StoreStats};
pub use http::HttpClient;
pub use manifest::ManifestFetcher;
pub use validate::CacheValidator;
pub use workers::Workers;
