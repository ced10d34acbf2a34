//! Download handler.
//!
//! Submits a batch to the scheduler and renders its events on a 100 ms poll
//! loop until the scheduler is idle. Ctrl-C requests a cooperative stop and
//! falls back to hard termination when the stop times out.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use vidgrab_core::download::{DownloadEvent, DownloadRequest, EventLevel, TaskId, TaskStatus};
use vidgrab_core::paths::{DirectoryCreationStrategy, ensure_directory};
use vidgrab_core::ports::{DownloadSchedulerPort, SubmitReport};
use vidgrab_download::{ProgressReceiver, ProgressReporter};

use crate::bootstrap::CliContext;
use crate::commands::DownloadArgs;
use crate::error::CliError;
use crate::presentation::{EventView, log_line, render_event, timestamp};

/// Interval of the UI poll loop.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// URLs listed in a batch file: one per line, blank lines and `#` comments
/// skipped.
pub fn parse_batch(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn collect_urls(args: &DownloadArgs) -> Result<Vec<String>, CliError> {
    let mut urls = args.urls.clone();
    if let Some(path) = &args.batch_file {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CliError::Io(format!("Failed to read batch file {}: {e}", path.display()))
        })?;
        urls.extend(parse_batch(&contents));
    }
    if urls.is_empty() {
        return Err(CliError::Arguments(
            "no URLs given (pass URLs or --batch-file)".to_string(),
        ));
    }
    Ok(urls)
}

/// One request per URL with the shared options of `args`.
pub fn build_requests(
    urls: Vec<String>,
    args: &DownloadArgs,
    save_dir: &Path,
    default_format: &str,
    proxy: Option<&str>,
) -> Vec<DownloadRequest> {
    let format = args
        .format
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or(default_format);

    urls.into_iter()
        .map(|url| {
            let request = DownloadRequest::new(url, save_dir)
                .with_proxy(proxy.map(str::to_string))
                .with_format(format)
                .with_subtitles(args.subs)
                .with_concurrency_hint(args.fragments);
            match &args.transcode {
                Some(target) => request.with_transcode(target.trim()),
                None => request,
            }
        })
        .collect()
}

/// Terminal outcomes seen on the event stream.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
    seen: HashSet<TaskId>,
}

impl RunSummary {
    /// Count a terminal status. Repeats for the same task are ignored.
    pub fn record(&mut self, event: &DownloadEvent) {
        let DownloadEvent::TaskStatus { snapshot } = event else {
            return;
        };
        if !snapshot.status.is_terminal() || !self.seen.insert(snapshot.id.clone()) {
            return;
        }
        match snapshot.status {
            TaskStatus::Succeeded => self.succeeded += 1,
            TaskStatus::Failed => self.failed += 1,
            TaskStatus::Cancelled => self.cancelled += 1,
            TaskStatus::Queued | TaskStatus::Running => {}
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.cancelled
    }
}

/// Terminal rendering of the event stream.
struct DownloadView {
    bar: ProgressBar,
    summary: RunSummary,
}

impl DownloadView {
    fn new(total: usize) -> Self {
        let bar = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {prefix} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        bar.set_style(style);
        bar.enable_steady_tick(POLL_INTERVAL);
        Self {
            bar,
            summary: RunSummary::default(),
        }
    }

    fn println(&self, line: &str) {
        if self.bar.is_hidden() {
            println!("{line}");
        } else {
            self.bar.println(line);
        }
    }

    fn render(&mut self, events: Vec<DownloadEvent>) {
        let now = timestamp();
        for event in events {
            tracing::trace!(event_type = event.event_type(), "Rendering event");
            self.summary.record(&event);
            match render_event(&event, now) {
                EventView::Line(line) => self.println(&line),
                EventView::Progress { task_id, message } => {
                    self.bar.set_message(format!("{task_id}: {message}"));
                }
                EventView::Batch {
                    current_index,
                    total_tasks,
                    ..
                } => {
                    self.bar.set_length(u64::from(total_tasks));
                    self.bar.set_position(u64::from(current_index));
                    self.bar.set_prefix(format!("{current_index}/{total_tasks}"));
                }
                EventView::Skip => {}
            }
        }
    }
}

fn print_rejections(report: &SubmitReport) {
    let now = timestamp();
    for (url, err) in &report.rejected {
        eprintln!(
            "{}",
            log_line(
                now,
                EventLevel::Error,
                &format!("Skipped {url}: {}", err.user_message())
            )
        );
    }
    for url in &report.duplicates {
        eprintln!(
            "{}",
            log_line(
                now,
                EventLevel::Warning,
                &format!("Skipped duplicate {url}")
            )
        );
    }
}

/// Start a cooperative stop in the background; terminate on timeout.
fn spawn_stop(scheduler: Arc<dyn DownloadSchedulerPort>, timeout: Duration) {
    tokio::spawn(async move {
        if !scheduler.stop(timeout).await {
            let signalled = scheduler.terminate_all().await;
            tracing::warn!(signalled, "Stop timed out; terminated running downloads");
        }
    });
}

async fn drive(
    scheduler: &Arc<dyn DownloadSchedulerPort>,
    rx: &mut ProgressReceiver,
    view: &mut DownloadView,
    stop_timeout: Duration,
) -> bool {
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut signal_armed = true;
    let mut interrupted = false;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            result = &mut ctrl_c, if signal_armed => {
                signal_armed = false;
                match result {
                    Ok(()) => {
                        interrupted = true;
                        view.println(&log_line(
                            timestamp(),
                            EventLevel::Warning,
                            "Stopping downloads...",
                        ));
                        spawn_stop(Arc::clone(scheduler), stop_timeout);
                    }
                    Err(e) => tracing::warn!(error = %e, "Ctrl-C handler unavailable"),
                }
            }
        }

        view.render(rx.drain());
        if scheduler.is_idle().await {
            break;
        }
    }

    view.render(rx.drain());
    interrupted
}

/// Execute the download command.
pub async fn execute(ctx: &CliContext, args: DownloadArgs) -> Result<(), CliError> {
    let urls = collect_urls(&args)?;
    let save_dir = ctx.download_dir(args.output.as_deref())?;
    ensure_directory(&save_dir, DirectoryCreationStrategy::AutoCreate)?;
    let requests = build_requests(
        urls,
        &args,
        &save_dir,
        &ctx.settings().effective_default_format(),
        ctx.proxy(),
    );

    let (reporter, mut rx) = ProgressReporter::channel();
    let scheduler = ctx.build_scheduler(reporter, args.workers)?;

    let report = scheduler.submit(requests).await?;
    print_rejections(&report);
    if report.is_empty() {
        scheduler.shutdown().await;
        return Err(CliError::Arguments("no valid URLs to download".to_string()));
    }
    println!(
        "Queued {} download(s) into {}",
        report.accepted.len(),
        save_dir.display()
    );

    let mut view = DownloadView::new(report.accepted.len());
    let stop_timeout = Duration::from_secs(ctx.settings().effective_stop_timeout_secs());
    let interrupted = drive(&scheduler, &mut rx, &mut view, stop_timeout).await;
    scheduler.shutdown().await;
    view.bar.finish_and_clear();

    let summary = view.summary;
    println!(
        "Done: {} succeeded, {} failed, {} cancelled",
        summary.succeeded, summary.failed, summary.cancelled
    );

    if interrupted {
        Err(CliError::Interrupted)
    } else if summary.failed > 0 {
        Err(CliError::BatchFailed {
            failed: summary.failed,
            total: summary.total(),
        })
    } else {
        Ok(())
    }
}
