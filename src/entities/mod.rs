//! Domain entities - frames, manifest, cursor and the collaborator traits
//!
//! Nothing here performs I/O; `core` does the fetching, caching and scheduling.

pub mod cursor;
pub mod error;
pub mod frame;
pub mod traits;

pub use cursor::PlaybackCursor;
pub use error::FetchError;
pub use frame::{FrameId, FrameKind, Manifest};
pub use traits::{HttpSource, Renderer, WorkerPool};
