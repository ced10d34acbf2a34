//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from
//! infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No process or filesystem implementation details in any signature
//! - Extractor and transcoder are black boxes behind intent-based methods
//! - The scheduler port is what UIs program against

pub mod event_emitter;
pub mod extractor;
pub mod history;
pub mod scheduler;
pub mod transcoder;

pub use event_emitter::DownloadEventEmitterPort;
pub use extractor::{ExtractorPort, ProgressCallback};
pub use history::HistoryStorePort;
pub use scheduler::{DownloadSchedulerPort, SchedulerConfig, SubmitReport};
pub use transcoder::TranscoderPort;
