//! Core download identifiers, requests, and the task state machine.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Format selector used when neither the user nor the advisor supplies one.
///
/// Best video plus best audio, falling back to the best combined stream.
pub const DEFAULT_FORMAT_SELECTOR: &str = "bv*+ba/b";

/// Default number of concurrent fragments requested from the extractor.
const DEFAULT_CONCURRENCY_HINT: u32 = 4;

/// Default container used when transcoding is enabled.
const DEFAULT_TRANSCODE_FORMAT: &str = "mp4";

static TASK_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Opaque, time-derived identifier for one download task.
///
/// Format: `<unix-millis>-<sequence>`. The sequence is process-wide, so two
/// ids minted in the same millisecond still differ.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Mint a fresh task id.
    #[must_use]
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let seq = TASK_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("{millis}-{seq}"))
    }

    /// Wrap an existing id string (e.g. one echoed back by a UI).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A request to download one video.
///
/// Built by the UI layer and handed to the scheduler by value; nothing
/// mutates it after it has been enqueued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// URL as entered by the user.
    pub url: String,
    /// Proxy URL, if the download should go through one.
    pub proxy: Option<String>,
    /// Directory the extractor writes into.
    pub save_path: PathBuf,
    /// Format selector (e.g. `137+140` or `bv*+ba/b`).
    pub format_id: String,
    /// Fetch subtitles (manual and automatic) alongside the media.
    pub download_subtitles: bool,
    /// Concurrent fragment count passed through to the extractor.
    pub concurrency_hint: u32,
    /// Transcode the downloaded file after a successful download.
    pub transcode: bool,
    /// Target container extension for transcoding (e.g. `mp4`).
    pub transcode_format: String,
}

impl DownloadRequest {
    /// Create a request with default options.
    pub fn new(url: impl Into<String>, save_path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            proxy: None,
            save_path: save_path.into(),
            format_id: DEFAULT_FORMAT_SELECTOR.to_string(),
            download_subtitles: false,
            concurrency_hint: DEFAULT_CONCURRENCY_HINT,
            transcode: false,
            transcode_format: DEFAULT_TRANSCODE_FORMAT.to_string(),
        }
    }

    /// Route the download through a proxy.
    #[must_use]
    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy.filter(|p| !p.trim().is_empty());
        self
    }

    /// Use a specific format selector. Blank selectors keep the default.
    #[must_use]
    pub fn with_format(mut self, format_id: impl Into<String>) -> Self {
        let format_id = format_id.into();
        if !format_id.trim().is_empty() {
            self.format_id = format_id.trim().to_string();
        }
        self
    }

    /// Toggle subtitle download.
    #[must_use]
    pub const fn with_subtitles(mut self, enabled: bool) -> Self {
        self.download_subtitles = enabled;
        self
    }

    /// Set the concurrent fragment hint (clamped to at least 1).
    #[must_use]
    pub fn with_concurrency_hint(mut self, hint: u32) -> Self {
        self.concurrency_hint = hint.max(1);
        self
    }

    /// Enable transcoding into the given container.
    #[must_use]
    pub fn with_transcode(mut self, format: impl Into<String>) -> Self {
        self.transcode = true;
        self.transcode_format = format.into();
        self
    }

    /// Whether this request routes through a proxy.
    #[must_use]
    pub const fn uses_proxy(&self) -> bool {
        self.proxy.is_some()
    }
}

/// Lifecycle status of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting in the queue.
    Queued,
    /// A worker is running it.
    Running,
    /// Downloaded successfully.
    Succeeded,
    /// Ended with an error.
    Failed,
    /// Stopped by an abort or an explicit cancel.
    Cancelled,
}

impl TaskStatus {
    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    /// Whether `self → next` is a legal transition.
    ///
    /// `Queued → Running → {Succeeded | Failed | Cancelled}` and
    /// `Queued → Cancelled`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Running | Self::Cancelled)
                | (Self::Running, Self::Succeeded | Self::Failed | Self::Cancelled)
        )
    }

    /// Short lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable state of one task.
///
/// Exactly one worker owns a `TaskState` and mutates it; everyone else sees
/// clones published as [`DownloadEvent::TaskStatus`](super::DownloadEvent).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskState {
    pub id: TaskId,
    pub url: String,
    pub status: TaskStatus,
    /// Progress percentage (0.0 - 100.0).
    pub progress_percent: f32,
    pub speed: String,
    pub eta: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskState {
    /// A freshly queued task.
    pub fn queued(id: TaskId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            status: TaskStatus::Queued,
            progress_percent: 0.0,
            speed: String::new(),
            eta: String::new(),
            title: None,
            error: None,
        }
    }

    /// Move to `next`, returning `false` (and leaving the state untouched)
    /// when the transition is not allowed.
    pub fn transition(&mut self, next: TaskStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        if next == TaskStatus::Succeeded {
            self.progress_percent = 100.0;
        }
        true
    }

    /// Record a progress tick.
    pub fn record_progress(&mut self, percent: f32, speed: &str, eta: &str) {
        self.progress_percent = percent.clamp(0.0, 100.0);
        speed.clone_into(&mut self.speed);
        eta.clone_into(&mut self.eta);
    }
}
