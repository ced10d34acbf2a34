//! Download worker pipeline.
//!
//! The worker operates on value types and cloned Arc dependencies, with no
//! access to the scheduler's queue lock. It owns the task's `TaskState` and
//! publishes a snapshot on every transition.
//!
//! # Pipeline
//!
//! normalize URL → abort checkpoint → ffmpeg dependency check → ensure save
//! directory → fetch (raced against the task token) → abort checkpoint →
//! append history → optional transcode

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

use vidgrab_core::domain::{HistoryEntry, VideoInfo};
use vidgrab_core::download::{
    DownloadError, DownloadEvent, DownloadRequest, DownloadResult, ExtractorOptions,
    FetchProgress, FetchStatus, ProgressControl, SubtitleOptions, TaskId, TaskState, TaskStatus,
};
use vidgrab_core::ports::{
    DownloadEventEmitterPort, ExtractorPort, HistoryStorePort, SchedulerConfig, TranscoderPort,
};
use vidgrab_core::utils::url_normalizer::UrlNormalizer;

use crate::cancel::AbortFlag;
use crate::format_advisor::requires_transcoder;
use crate::progress::ProgressThrottle;

/// Dependencies for the download worker.
#[derive(Clone)]
pub struct WorkerDeps {
    pub extractor: Arc<dyn ExtractorPort>,
    pub transcoder: Arc<dyn TranscoderPort>,
    pub history: Arc<dyn HistoryStorePort>,
    pub emitter: Arc<dyn DownloadEventEmitterPort>,
    pub normalizer: UrlNormalizer,
    pub config: SchedulerConfig,
    pub abort: AbortFlag,
}

/// One dispatched request.
pub struct DownloadJob {
    pub id: TaskId,
    pub request: DownloadRequest,
    /// Hard cancellation for this task.
    pub cancel: CancellationToken,
    /// Abort generation at dispatch.
    pub generation: u64,
}

impl DownloadJob {
    fn should_stop(&self, abort: &AbortFlag) -> bool {
        abort.aborted_since(self.generation) || self.cancel.is_cancelled()
    }
}

/// Result of a successful download.
#[derive(Debug, Clone)]
pub struct CompletedJob {
    pub info: VideoInfo,
    /// The downloaded file.
    pub output: PathBuf,
    /// The transcoded copy, when requested.
    pub transcoded: Option<PathBuf>,
}

/// Latest progress seen by the extractor callback.
struct ProgressTracker {
    throttle: ProgressThrottle,
    percent: f32,
    speed: String,
    eta: String,
}

/// Path of the transcoded copy next to `input`. Never equal to `input`.
pub fn transcode_target(input: &Path, format: &str) -> PathBuf {
    let format = format.trim().trim_start_matches('.');
    let target = input.with_extension(format);
    if target == input {
        let stem = input
            .file_stem()
            .map_or_else(|| "video".into(), |s| s.to_string_lossy());
        input.with_file_name(format!("{stem}_converted.{format}"))
    } else {
        target
    }
}

fn publish_status(deps: &WorkerDeps, state: &TaskState) {
    deps.emitter.emit(DownloadEvent::TaskStatus {
        snapshot: state.clone(),
    });
}

fn checkpoint(deps: &WorkerDeps, job: &DownloadJob) -> DownloadResult<()> {
    if job.should_stop(&deps.abort) {
        Err(DownloadError::Cancelled)
    } else {
        Ok(())
    }
}

fn extractor_options(deps: &WorkerDeps, request: &DownloadRequest, url: &str) -> ExtractorOptions {
    let base = ExtractorOptions {
        timeout_secs: deps.config.socket_timeout_secs,
        retries: deps.config.retries,
        subtitles: SubtitleOptions {
            enabled: false,
            languages: deps.config.subtitle_languages.clone(),
        },
        ..ExtractorOptions::default()
    };
    let mut options = ExtractorOptions::for_request(&base, request);
    if options.format.trim().is_empty() {
        options.format.clone_from(&deps.config.default_format);
    }
    tracing::trace!(url, format = %options.format, "Extractor options resolved");
    options
}

async fn append_history(deps: &WorkerDeps, id: &TaskId, entry: HistoryEntry) {
    let history = Arc::clone(&deps.history);
    match tokio::task::spawn_blocking(move || history.append(entry)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::warn!(task_id = %id, error = %e, "History not persisted");
            deps.emitter.emit(DownloadEvent::warning(e.user_message()));
        }
        Err(e) => {
            tracing::warn!(task_id = %id, error = %e, "History append task failed");
            deps.emitter
                .emit(DownloadEvent::warning("Download history could not be saved"));
        }
    }
}

/// Run a job to completion, updating `state` along the way.
///
/// `state` is moved to `Running` first; the caller publishes the terminal
/// status.
pub async fn run_job(
    job: &DownloadJob,
    deps: &WorkerDeps,
    state: &mut TaskState,
) -> DownloadResult<CompletedJob> {
    let request = &job.request;
    if state.transition(TaskStatus::Running) {
        publish_status(deps, state);
    }

    let normalized = deps.normalizer.normalize(&request.url)?;
    if let Some(note) = normalized.note() {
        deps.emitter.emit(DownloadEvent::info(note));
    }
    let url = normalized.url;

    checkpoint(deps, job)?;

    let options = extractor_options(deps, request, &url);
    if requires_transcoder(&options.format) && !deps.transcoder.is_available() {
        return Err(DownloadError::missing_dependency("ffmpeg"));
    }
    if request.transcode && !deps.transcoder.is_available() {
        return Err(DownloadError::missing_dependency("ffmpeg"));
    }

    let save_path = request.save_path.clone();
    tokio::fs::create_dir_all(&save_path)
        .await
        .map_err(|e| DownloadError::from_io_error(&e))?;

    deps.emitter
        .emit(DownloadEvent::info(format!("Starting download: {url}")));
    tracing::info!(task_id = %job.id, %url, save_path = %save_path.display(), "Download started");

    let tracker = Mutex::new(ProgressTracker {
        throttle: ProgressThrottle::new(deps.config.progress_interval),
        percent: 0.0,
        speed: String::new(),
        eta: String::new(),
    });
    let on_progress = |progress: FetchProgress| -> ProgressControl {
        if job.should_stop(&deps.abort) {
            return ProgressControl::Abort;
        }
        let percent = match progress.status {
            FetchStatus::Finished => 100.0,
            FetchStatus::Downloading => progress.percent().unwrap_or(0.0),
        };
        let mut tracker = tracker.lock().unwrap_or_else(PoisonError::into_inner);
        tracker.percent = percent;
        tracker.speed.clone_from(&progress.speed_text);
        tracker.eta.clone_from(&progress.eta_text);
        if tracker.throttle.should_emit(percent) {
            deps.emitter.emit(DownloadEvent::progress(
                job.id.clone(),
                percent,
                progress.speed_text,
                progress.eta_text,
            ));
        }
        ProgressControl::Continue
    };

    let info = tokio::select! {
        biased;
        () = job.cancel.cancelled() => {
            tracing::info!(task_id = %job.id, "Download terminated");
            return Err(DownloadError::Cancelled);
        }
        result = deps.extractor.fetch(&url, &save_path, &options, &on_progress) => result?,
    };

    {
        let tracker = tracker.lock().unwrap_or_else(PoisonError::into_inner);
        state.record_progress(tracker.percent, &tracker.speed, &tracker.eta);
    }
    state.title = Some(info.title.clone());

    checkpoint(deps, job)?;

    let output = info.output_path(&save_path);
    tracing::info!(task_id = %job.id, title = %info.title, output = %output.display(), "Download finished");

    append_history(
        deps,
        &job.id,
        HistoryEntry::now(&url, info.title.clone(), options.format.clone(), &save_path),
    )
    .await;

    let transcoded = if request.transcode {
        let target = transcode_target(&output, &request.transcode_format);
        deps.emitter.emit(DownloadEvent::info(format!(
            "Transcoding: {} -> {}",
            output.display(),
            target.display()
        )));
        tokio::select! {
            biased;
            () = job.cancel.cancelled() => return Err(DownloadError::Cancelled),
            result = deps.transcoder.transcode(&output, &target) => result?,
        }
        deps.emitter.emit(DownloadEvent::success(format!(
            "Transcode finished: {}",
            target.display()
        )));
        Some(target)
    } else {
        None
    };

    Ok(CompletedJob {
        info,
        output,
        transcoded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcode_target_swaps_extension() {
        assert_eq!(
            transcode_target(Path::new("/d/My Video.webm"), "mp4"),
            PathBuf::from("/d/My Video.mp4")
        );
        assert_eq!(
            transcode_target(Path::new("/d/clip.webm"), ".mkv"),
            PathBuf::from("/d/clip.mkv")
        );
    }

    #[test]
    fn transcode_target_never_overwrites_input() {
        assert_eq!(
            transcode_target(Path::new("/d/clip.mp4"), "mp4"),
            PathBuf::from("/d/clip_converted.mp4")
        );
    }
}
