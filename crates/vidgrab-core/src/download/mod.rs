//! Download domain types, events, errors, and extractor-facing options.
//!
//! This module contains pure data types for the download orchestrator.
//! No I/O, process spawning, or runtime dependencies allowed.
//!
//! # Structure
//!
//! - `types` - Identifiers, requests, and the per-task state machine
//! - `events` - Events carried from workers to the UI poll loop
//! - `errors` - Error taxonomy and remediation hints
//! - `options` - Options handed to the extractor and its progress ticks
//! - `queue` - Queue snapshot DTOs

pub mod errors;
pub mod events;
pub mod options;
pub mod queue;
pub mod types;

// Re-export commonly used types
pub use errors::{DownloadError, DownloadResult, FailureCategory};
pub use events::{DownloadEvent, EventLevel};
pub use options::{
    ExtractorOptions, FetchProgress, FetchStatus, ProgressControl, SubtitleOptions,
};
pub use queue::{QueueSnapshot, QueuedRequest};
pub use types::{DEFAULT_FORMAT_SELECTOR, DownloadRequest, TaskId, TaskState, TaskStatus};
