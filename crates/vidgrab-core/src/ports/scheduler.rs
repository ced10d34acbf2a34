//! Download scheduler port.
//!
//! UIs program against [`DownloadSchedulerPort`]; the implementation lives
//! in the download crate.

use std::time::Duration;

use async_trait::async_trait;

use crate::download::{DownloadError, DownloadRequest, QueueSnapshot, TaskId};
use crate::settings::Settings;

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Worker pool size.
    pub max_workers: u32,
    /// Bounded wait of the consumer loop between dequeue attempts.
    pub poll_interval: Duration,
    /// Minimum spacing between forwarded progress ticks per task.
    pub progress_interval: Duration,
    pub socket_timeout_secs: u64,
    pub retries: u32,
    pub subtitle_languages: Vec<String>,
    /// Hosts accepted by the URL normalizer.
    pub allowed_hosts: Vec<String>,
    /// Selector used when a request carries none.
    pub default_format: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl SchedulerConfig {
    /// Build a config from settings, applying defaults.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_workers: settings.effective_max_concurrent_downloads(),
            poll_interval: Duration::from_secs(1),
            progress_interval: Duration::from_millis(100),
            socket_timeout_secs: settings.effective_socket_timeout_secs(),
            retries: settings.effective_retries(),
            subtitle_languages: settings.effective_subtitle_languages(),
            allowed_hosts: settings.effective_allowed_hosts(),
            default_format: settings.effective_default_format(),
        }
    }

    #[must_use]
    pub const fn with_max_workers(mut self, max: u32) -> Self {
        self.max_workers = if max == 0 { 1 } else { max };
        self
    }

    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub const fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }
}

/// Outcome of a batch submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitReport {
    /// Ids assigned to accepted requests, in submission order.
    pub accepted: Vec<TaskId>,
    /// Rejected inputs with the reason.
    pub rejected: Vec<(String, DownloadError)>,
    /// URLs dropped as duplicates (within the batch or already pending).
    pub duplicates: Vec<String>,
}

impl SubmitReport {
    /// Whether nothing was enqueued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}

/// Port for the download orchestrator.
#[async_trait]
pub trait DownloadSchedulerPort: Send + Sync {
    /// Validate, de-duplicate, and enqueue a batch of requests.
    async fn submit(&self, requests: Vec<DownloadRequest>) -> Result<SubmitReport, DownloadError>;

    /// Append one request to the queue. Fails only after `shutdown`.
    async fn enqueue(&self, request: DownloadRequest) -> Result<TaskId, DownloadError>;

    /// Set the abort flag: nothing new starts, running tasks stop at the
    /// next checkpoint.
    async fn request_abort_all(&self);

    /// Clear the abort flag.
    async fn resume(&self);

    /// Hard-cancel one running task. Returns `false` if it is not running.
    async fn cancel_task(&self, id: &TaskId) -> bool;

    /// Hard-cancel every running task. Returns how many were signalled.
    async fn terminate_all(&self) -> usize;

    /// Abort and wait up to `timeout` for running tasks to stop.
    ///
    /// Returns `true` when every task stopped in time.
    async fn stop(&self, timeout: Duration) -> bool;

    /// Reject new work and let the consumer loop exit.
    async fn shutdown(&self);

    /// Current queue state.
    async fn snapshot(&self) -> QueueSnapshot;

    /// Whether nothing is pending or running.
    async fn is_idle(&self) -> bool;
}
