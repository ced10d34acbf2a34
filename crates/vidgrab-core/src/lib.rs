//! Core domain types and port definitions for vidgrab.
//!
//! This crate holds everything the download orchestrator reasons about
//! without touching processes or the network: requests, task state, events,
//! errors, typed format metadata, history entries, settings, URL
//! normalization, and the port traits implemented by adapters.
//!
//! - `download` - Requests, task state machine, events, errors, queue snapshots
//! - `domain` - Video/format metadata and history entries
//! - `ports` - Trait abstractions for the extractor, transcoder, history store,
//!   event emission, and the scheduler itself
//! - `settings` - User-configurable settings and validation
//! - `paths` - Data directory resolution
//! - `utils` - URL normalization

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod download;
pub mod paths;
pub mod ports;
pub mod settings;
pub mod utils;

// Re-export commonly used types for convenience
pub use domain::{FileSize, FormatDescriptor, HistoryEntry, RawFormat, RawVideoInfo, VideoInfo};
pub use download::{
    DEFAULT_FORMAT_SELECTOR, DownloadError, DownloadEvent, DownloadRequest, DownloadResult,
    EventLevel, ExtractorOptions, FailureCategory, FetchProgress, FetchStatus, ProgressControl,
    QueueSnapshot, QueuedRequest, SubtitleOptions, TaskId, TaskState, TaskStatus,
};
pub use paths::{PathError, data_root, default_download_dir, history_path, settings_path};
pub use ports::{
    DownloadEventEmitterPort, DownloadSchedulerPort, ExtractorPort, HistoryStorePort,
    ProgressCallback, SchedulerConfig, SubmitReport, TranscoderPort,
};
pub use settings::{Settings, SettingsError, validate_settings};
pub use utils::url_normalizer::{NormalizedUrl, PlaylistKind, UrlAnalysis, UrlNormalizer};

#[cfg(test)]
use tempfile as _;
