//! Hand-written fake ports for scheduler tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use vidgrab_core::domain::{HistoryEntry, VideoInfo};
use vidgrab_core::download::{
    DownloadError, DownloadEvent, DownloadResult, ExtractorOptions, FetchProgress,
    ProgressControl, TaskId, TaskStatus,
};
use vidgrab_core::ports::{
    DownloadEventEmitterPort, ExtractorPort, HistoryStorePort, ProgressCallback, SchedulerConfig,
    TranscoderPort,
};
use vidgrab_download::{DownloadSchedulerImpl, SchedulerDeps, build_scheduler};

// ── Extractor ──────────────────────────────────────────────────────

/// What the fake extractor does for a URL.
#[derive(Clone, Debug)]
pub enum Behavior {
    /// Report a few ticks, then succeed.
    Succeed,
    /// Sleep, then succeed. Ignores the abort signal.
    Slow(Duration),
    /// Return this error.
    Fail(DownloadError),
    /// Tick every 10 ms until the callback asks to abort.
    UntilAborted,
    /// Never return and never report progress.
    Block,
}

#[derive(Default)]
pub struct FakeExtractor {
    behaviors: Mutex<HashMap<String, Behavior>>,
    fetches: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    formats_seen: Mutex<Vec<String>>,
}

impl FakeExtractor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, url: &str, behavior: Behavior) {
        self.behaviors
            .lock()
            .unwrap()
            .insert(url.to_string(), behavior);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn formats_seen(&self) -> Vec<String> {
        self.formats_seen.lock().unwrap().clone()
    }

    fn behavior(&self, url: &str) -> Behavior {
        self.behaviors
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or(Behavior::Succeed)
    }
}

pub fn video_info(url: &str) -> VideoInfo {
    let id = url.rsplit('=').next().unwrap_or("video").to_string();
    VideoInfo {
        title: format!("Title {id}"),
        id,
        extension: "webm".to_string(),
        ..VideoInfo::default()
    }
}

/// Decrements the in-flight counter when a fetch ends, however it ends.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ExtractorPort for FakeExtractor {
    async fn probe(&self, url: &str, _options: &ExtractorOptions) -> DownloadResult<VideoInfo> {
        Ok(video_info(url))
    }

    async fn fetch(
        &self,
        url: &str,
        _save_dir: &Path,
        options: &ExtractorOptions,
        on_progress: ProgressCallback<'_>,
    ) -> DownloadResult<VideoInfo> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.formats_seen.lock().unwrap().push(options.format.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        match self.behavior(url) {
            Behavior::Succeed => {
                for pct in ["25%", "50%", "75%"] {
                    if on_progress(FetchProgress::downloading(pct, "1.00MiB/s", "00:01"))
                        == ProgressControl::Abort
                    {
                        return Err(DownloadError::Cancelled);
                    }
                    tokio::task::yield_now().await;
                }
                on_progress(FetchProgress::finished());
                Ok(video_info(url))
            }
            Behavior::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(video_info(url))
            }
            Behavior::Fail(err) => Err(err),
            Behavior::UntilAborted => loop {
                if on_progress(FetchProgress::downloading("10%", "1.00MiB/s", "00:10"))
                    == ProgressControl::Abort
                {
                    return Err(DownloadError::Cancelled);
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            },
            Behavior::Block => std::future::pending().await,
        }
    }
}

// ── Transcoder ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeTranscoder {
    pub available: bool,
    pub fail: bool,
    calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl FakeTranscoder {
    pub fn available() -> Arc<Self> {
        Arc::new(Self {
            available: true,
            ..Self::default()
        })
    }

    pub fn missing() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            available: true,
            fail: true,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscoderPort for FakeTranscoder {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn transcode(&self, input: &Path, output: &Path) -> DownloadResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((input.to_path_buf(), output.to_path_buf()));
        if self.fail {
            Err(DownloadError::transcode_failed(Some(1), "Invalid data found"))
        } else {
            Ok(())
        }
    }
}

// ── History ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryHistory {
    pub fail: bool,
    entries: Mutex<Vec<HistoryEntry>>,
}

impl MemoryHistory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn load_entries(&self) -> Vec<HistoryEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl HistoryStorePort for MemoryHistory {
    fn append(&self, entry: HistoryEntry) -> DownloadResult<()> {
        self.entries.lock().unwrap().push(entry);
        if self.fail {
            Err(DownloadError::history_persist_failed("disk full"))
        } else {
            Ok(())
        }
    }

    fn load(&self) -> Vec<HistoryEntry> {
        self.entries.lock().unwrap().clone()
    }

    fn max_entries(&self) -> usize {
        1000
    }
}

// ── Emitter ────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingEmitter {
    events: Arc<Mutex<Vec<DownloadEvent>>>,
}

impl RecordingEmitter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<DownloadEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Last status published for `id`.
    pub fn final_status(&self, id: &TaskId) -> Option<TaskStatus> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DownloadEvent::TaskStatus { snapshot } if &snapshot.id == id => {
                    Some(snapshot.status)
                }
                _ => None,
            })
            .last()
    }

    /// Number of terminal statuses published for `id`.
    pub fn terminal_count(&self, id: &TaskId) -> usize {
        self.events()
            .iter()
            .filter(|e| match e {
                DownloadEvent::TaskStatus { snapshot } => {
                    &snapshot.id == id && snapshot.status.is_terminal()
                }
                _ => false,
            })
            .count()
    }

    /// Messages of the log-line events, in order.
    pub fn lines(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(|e| e.log_line().map(|(_, msg)| msg.to_string()))
            .collect()
    }

    pub fn progress_for(&self, id: &TaskId) -> Vec<f32> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                DownloadEvent::Progress {
                    task_id, percent, ..
                } if task_id == id => Some(*percent),
                _ => None,
            })
            .collect()
    }
}

impl DownloadEventEmitterPort for RecordingEmitter {
    fn emit(&self, event: DownloadEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn clone_box(&self) -> Box<dyn DownloadEventEmitterPort> {
        Box::new(self.clone())
    }
}

// ── Harness ────────────────────────────────────────────────────────

pub struct Harness {
    pub scheduler: Arc<DownloadSchedulerImpl>,
    pub extractor: Arc<FakeExtractor>,
    pub transcoder: Arc<FakeTranscoder>,
    pub history: Arc<MemoryHistory>,
    pub emitter: Arc<RecordingEmitter>,
    pub dir: tempfile::TempDir,
}

pub fn test_config(max_workers: u32) -> SchedulerConfig {
    SchedulerConfig::default()
        .with_max_workers(max_workers)
        .with_poll_interval(Duration::from_millis(10))
        .with_progress_interval(Duration::ZERO)
}

impl Harness {
    pub fn new(max_workers: u32) -> Self {
        Self::with_parts(max_workers, FakeTranscoder::available(), MemoryHistory::new())
    }

    pub fn with_parts(
        max_workers: u32,
        transcoder: Arc<FakeTranscoder>,
        history: Arc<MemoryHistory>,
    ) -> Self {
        let extractor = FakeExtractor::new();
        let emitter = RecordingEmitter::new();
        let scheduler = build_scheduler(SchedulerDeps {
            extractor: extractor.clone(),
            transcoder: transcoder.clone(),
            history: history.clone(),
            emitter: emitter.clone(),
            config: test_config(max_workers),
        });
        Self {
            scheduler,
            extractor,
            transcoder,
            history,
            emitter,
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn request(&self, url: &str) -> vidgrab_core::download::DownloadRequest {
        vidgrab_core::download::DownloadRequest::new(url, self.dir.path())
    }

    /// Poll until nothing is pending or running.
    pub async fn wait_idle(&self) {
        wait_for(|| self.scheduler.is_idle()).await;
    }

    /// Poll until `n` tasks are registered as running.
    pub async fn wait_running(&self, n: usize) {
        wait_for(|| self.scheduler.cancellation().active_count() == n).await;
    }
}

pub async fn wait_for(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached within 5s"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

pub fn url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={id}")
}
