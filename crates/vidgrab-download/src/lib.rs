//! Download orchestrator for vidgrab.
//!
//! Accepts download requests, queues them, runs each on a bounded pool of
//! background workers driving an external extractor (yt-dlp compatible) and
//! an optional transcoder (ffmpeg compatible), and streams progress to a
//! single UI poll loop through a channel.
//!
//! - `queue` - Pure FIFO state machine with batch counters
//! - `scheduler` - Consumer loop, worker pool, and worker pipeline
//! - `cancel` - Abort flag and per-task handle registry
//! - `progress` - Event channel and progress throttling
//! - `format_advisor` - Best video+audio selector recommendation
//! - `extractor` / `transcoder` - Subprocess adapters
//! - `history` - Bounded JSON history store
//! - `process` - Child process shutdown

#![deny(unused_crate_dependencies)]

// Re-export core types for convenience
pub use vidgrab_core::download::{
    DownloadError, DownloadEvent, DownloadRequest, QueueSnapshot, TaskId, TaskState, TaskStatus,
};
pub use vidgrab_core::ports::{DownloadSchedulerPort, SchedulerConfig, SubmitReport};

pub mod cancel;
pub mod extractor;
pub mod format_advisor;
pub mod history;
pub mod process;
pub mod progress;
pub(crate) mod queue;
mod scheduler;
pub mod transcoder;

pub use cancel::{AbortFlag, CancellationController, TaskCompletion, TaskHandle};
pub use extractor::YtDlpExtractor;
pub use format_advisor::{
    AudioExtraction, FormatSelection, SelectionSource, audio_extraction, recommend,
    requires_merge, requires_transcoder, select_format,
};
pub use history::JsonHistoryStore;
pub use progress::{ProgressReceiver, ProgressReporter, ProgressThrottle};
pub use scheduler::{DownloadSchedulerImpl, SchedulerDeps, build_scheduler};
pub use transcoder::{FfmpegTranscoder, TranscodeProfile};
