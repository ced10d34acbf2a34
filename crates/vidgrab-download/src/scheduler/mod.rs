//! Download scheduler implementation.
//!
//! # Architecture
//!
//! - **Scheduler**: owns the queue, the cancellation controller, and the
//!   worker pool; implements `DownloadSchedulerPort`
//! - **Consumer loop**: single long-lived task that moves requests from the
//!   queue onto workers
//! - **Worker**: runs one request through the pipeline in `worker`
//!
//! # Concurrency Model
//!
//! - Single long-lived consumer loop (`runner_started` is never reset)
//! - `Notify` plus a bounded wait for wake-on-work
//! - A `Semaphore` sized `max_workers` bounds running workers
//! - The queue mutex is never held across an await

mod worker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};

use vidgrab_core::download::{
    DownloadError, DownloadEvent, DownloadRequest, QueueSnapshot, TaskId, TaskState, TaskStatus,
};
use vidgrab_core::ports::{
    DownloadEventEmitterPort, DownloadSchedulerPort, ExtractorPort, HistoryStorePort,
    SchedulerConfig, SubmitReport, TranscoderPort,
};
use vidgrab_core::utils::url_normalizer::UrlNormalizer;

use crate::cancel::{CancellationController, TaskHandle};
use crate::queue::{DownloadQueue, QueuedItem};

use worker::{CompletedJob, DownloadJob, WorkerDeps};

/// Dependencies for building a scheduler.
pub struct SchedulerDeps {
    pub extractor: Arc<dyn ExtractorPort>,
    pub transcoder: Arc<dyn TranscoderPort>,
    pub history: Arc<dyn HistoryStorePort>,
    pub emitter: Arc<dyn DownloadEventEmitterPort>,
    pub config: SchedulerConfig,
}

/// Build a scheduler from its dependencies.
///
/// The consumer loop starts lazily on the first enqueue, so this must be
/// called inside a tokio runtime only if work is submitted.
pub fn build_scheduler(deps: SchedulerDeps) -> Arc<DownloadSchedulerImpl> {
    Arc::new_cyclic(|this| DownloadSchedulerImpl::new(deps, this.clone()))
}

/// Concrete scheduler.
///
/// Adapters should usually hold it as `Arc<dyn DownloadSchedulerPort>`.
pub struct DownloadSchedulerImpl {
    this: Weak<Self>,
    deps: WorkerDeps,
    queue: Mutex<DownloadQueue>,
    cancel: CancellationController,
    /// Wakes the consumer loop when work arrives or a worker finishes.
    queue_notify: Notify,
    workers: Arc<Semaphore>,
    runner_started: AtomicBool,
}

impl DownloadSchedulerImpl {
    fn new(deps: SchedulerDeps, this: Weak<Self>) -> Self {
        let config = deps
            .config
            .clone()
            .with_max_workers(deps.config.max_workers);
        let cancel = CancellationController::new();
        let normalizer = UrlNormalizer::new(config.allowed_hosts.iter().cloned());
        let workers = Arc::new(Semaphore::new(config.max_workers as usize));

        Self {
            this,
            deps: WorkerDeps {
                extractor: deps.extractor,
                transcoder: deps.transcoder,
                history: deps.history,
                emitter: deps.emitter,
                normalizer,
                abort: cancel.abort_flag(),
                config,
            },
            queue: Mutex::new(DownloadQueue::new()),
            cancel,
            queue_notify: Notify::new(),
            workers,
            runner_started: AtomicBool::new(false),
        }
    }

    fn queue(&self) -> MutexGuard<'_, DownloadQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.deps.config
    }

    /// The cancellation controller shared with workers.
    pub fn cancellation(&self) -> &CancellationController {
        &self.cancel
    }

    /// Start the consumer loop once. Later calls are no-ops.
    ///
    /// Requires a tokio runtime.
    pub fn ensure_runner(&self) {
        let Some(scheduler) = self.this.upgrade() else {
            return;
        };
        if self
            .runner_started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            tracing::debug!(workers = self.deps.config.max_workers, "Starting consumer loop");
            tokio::spawn(async move {
                scheduler.run_loop().await;
            });
        }
    }

    /// Wait for a notification, at most one poll interval.
    async fn wait_for_work(&self) {
        let _ = tokio::time::timeout(self.deps.config.poll_interval, self.queue_notify.notified())
            .await;
    }

    /// The consumer loop. Exits only after `shutdown` once the queue is empty.
    async fn run_loop(self: Arc<Self>) {
        loop {
            let aborted = self.cancel.is_aborted();
            if aborted {
                self.discard_pending();
            }
            {
                let queue = self.queue();
                if queue.is_shut_down() && queue.pending_len() == 0 {
                    break;
                }
            }
            if aborted {
                self.wait_for_work().await;
                continue;
            }

            let Ok(permit) = Arc::clone(&self.workers).acquire_owned().await else {
                break;
            };

            let next = {
                let mut queue = self.queue();
                self.deps.abort.live_generation().and_then(|generation| {
                    queue
                        .dequeue()
                        .map(|item| (item, generation, queue.batch_counters()))
                })
            };

            match next {
                Some((item, generation, counters)) => {
                    self.dispatch(item, generation, counters, permit);
                }
                None => {
                    drop(permit);
                    self.wait_for_work().await;
                }
            }
        }
        tracing::debug!("Consumer loop exited");
    }

    fn dispatch(
        self: &Arc<Self>,
        item: QueuedItem,
        generation: u64,
        (current, total): (u32, u32),
        permit: OwnedSemaphorePermit,
    ) {
        let QueuedItem {
            id,
            request,
            queued_at,
        } = item;

        let (handle, completion) = TaskHandle::new();
        self.cancel.register(id.clone(), handle);
        self.deps
            .emitter
            .emit(DownloadEvent::batch_progress(current, total));
        tracing::info!(
            task_id = %id,
            url = %request.url,
            waited_ms = u64::try_from(queued_at.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Dispatching download"
        );

        let job = DownloadJob {
            id: id.clone(),
            request,
            cancel: completion.token(),
            generation,
        };
        let deps = self.deps.clone();
        let scheduler = Arc::clone(self);

        tokio::spawn(async move {
            let proxy_in_use = job.request.uses_proxy();
            let url = job.request.url.clone();
            let mut state = TaskState::queued(job.id.clone(), url.clone());

            // Run the pipeline in its own task so a panic is contained.
            let pipeline = tokio::spawn(async move {
                let result = worker::run_job(&job, &deps, &mut state).await;
                (state, result)
            });
            let (state, result) = match pipeline.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(task_id = %id, error = %e, "Worker aborted");
                    let mut state = TaskState::queued(id.clone(), url);
                    state.transition(TaskStatus::Running);
                    (state, Err(DownloadError::other(format!("worker aborted: {e}"))))
                }
            };

            scheduler.finalize(state, result, proxy_in_use);
            completion.complete();
            drop(permit);
            scheduler.queue_notify.notify_one();
        });
    }

    /// Publish the terminal status and lines for one task, then release it.
    fn finalize(
        &self,
        mut state: TaskState,
        result: Result<CompletedJob, DownloadError>,
        proxy_in_use: bool,
    ) {
        let emitter = &self.deps.emitter;
        let id = state.id.clone();

        match result {
            Ok(completed) => {
                state.transition(TaskStatus::Succeeded);
                tracing::info!(
                    task_id = %id,
                    title = %completed.info.title,
                    output = %completed.output.display(),
                    transcoded = ?completed.transcoded,
                    "Download succeeded"
                );
                emitter.emit(DownloadEvent::TaskStatus {
                    snapshot: state.clone(),
                });
                emitter.emit(DownloadEvent::success(format!(
                    "Download complete: {}",
                    completed.info.title
                )));
            }
            Err(e) if e.is_cancelled() => {
                state.transition(TaskStatus::Cancelled);
                tracing::info!(task_id = %id, "Download cancelled");
                emitter.emit(DownloadEvent::TaskStatus {
                    snapshot: state.clone(),
                });
                emitter.emit(DownloadEvent::warning(format!(
                    "Download cancelled: {}",
                    state.title.as_deref().unwrap_or(&state.url)
                )));
            }
            Err(e) => {
                state.transition(TaskStatus::Failed);
                state.error = Some(e.to_string());
                tracing::warn!(task_id = %id, error = %e, "Download failed");
                emitter.emit(DownloadEvent::TaskStatus {
                    snapshot: state.clone(),
                });
                emitter.emit(DownloadEvent::error(e.user_message()));
                emit_hints(emitter.as_ref(), &e.remediation_hints(proxy_in_use));
            }
        }

        // The closing batch event precedes idle.
        let (current, total) = self.queue().batch_counters();
        self.cancel.unregister(&id);
        emitter.emit(DownloadEvent::batch_progress(current, total));
        self.queue().finish();
    }

    /// Drop every pending request, publishing its `Cancelled` status and line.
    fn discard_pending(&self) -> usize {
        let drained = self.queue().drain();
        for item in &drained {
            self.publish_cancelled(item);
        }
        if !drained.is_empty() {
            tracing::info!(count = drained.len(), "Discarded pending downloads");
        }
        drained.len()
    }

    fn publish_cancelled(&self, item: &QueuedItem) {
        let mut state = TaskState::queued(item.id.clone(), item.request.url.clone());
        state.transition(TaskStatus::Cancelled);
        let emitter = &self.deps.emitter;
        emitter.emit(DownloadEvent::TaskStatus { snapshot: state });
        emitter.emit(DownloadEvent::warning(format!(
            "Download cancelled: {}",
            item.request.url
        )));
    }

    fn push(&self, item: QueuedItem) -> Result<TaskId, DownloadError> {
        let id = item.id.clone();
        let position = self.queue().enqueue(item)?;
        tracing::debug!(task_id = %id, position, "Queued download");
        Ok(id)
    }

    fn wake(&self) {
        self.ensure_runner();
        self.queue_notify.notify_one();
    }

    /// Validate, de-duplicate, and enqueue a batch.
    pub fn submit(&self, requests: Vec<DownloadRequest>) -> Result<SubmitReport, DownloadError> {
        if self.queue().is_shut_down() {
            return Err(DownloadError::QueueShutDown);
        }

        if self.cancel.is_aborted() {
            self.discard_pending();
            self.cancel.reset();
            tracing::debug!("Cleared previous abort for new batch");
        }
        if self.queue().begin_batch() {
            tracing::debug!("Starting new batch");
        }

        let mut report = SubmitReport::default();
        let mut seen: Vec<String> = Vec::new();

        for mut request in requests {
            let url = request.url.trim().to_string();
            if url.is_empty() {
                report
                    .rejected
                    .push((url.clone(), DownloadError::invalid_url(url, "empty URL")));
                continue;
            }
            if let Err(e) = self.deps.normalizer.normalize(&url) {
                tracing::debug!(%url, error = %e, "Rejected URL");
                report.rejected.push((url, e));
                continue;
            }
            if seen.contains(&url) || self.queue().contains_url(&url) {
                report.duplicates.push(url);
                continue;
            }
            seen.push(url.clone());
            request.url = url;

            report.accepted.push(self.push(QueuedItem::new(request))?);
        }

        tracing::info!(
            accepted = report.accepted.len(),
            rejected = report.rejected.len(),
            duplicates = report.duplicates.len(),
            "Batch submitted"
        );
        if !report.is_empty() {
            self.wake();
        }
        Ok(report)
    }

    /// Append one request without validation.
    pub fn enqueue(&self, request: DownloadRequest) -> Result<TaskId, DownloadError> {
        let id = self.push(QueuedItem::new(request))?;
        self.wake();
        Ok(id)
    }

    pub fn request_abort_all(&self) {
        tracing::info!("Abort requested");
        self.cancel.request_abort_all();
        self.queue_notify.notify_one();
    }

    pub fn resume(&self) {
        self.cancel.reset();
        self.queue_notify.notify_one();
    }

    /// Hard-cancel a running task, or drop it if still pending.
    pub fn cancel_task(&self, id: &TaskId) -> bool {
        if self.cancel.cancel_task(id) {
            tracing::info!(task_id = %id, "Cancelling running download");
            return true;
        }
        let Some(item) = self.queue().remove(id) else {
            return false;
        };
        tracing::info!(task_id = %id, "Removed pending download");
        self.publish_cancelled(&item);
        true
    }

    pub fn terminate_all(&self) -> usize {
        let count = self.cancel.terminate_all();
        tracing::info!(count, "Terminating running downloads");
        count
    }

    /// Abort, then wait up to `timeout` for running tasks to stop.
    pub async fn stop(&self, timeout: Duration) -> bool {
        self.request_abort_all();
        self.discard_pending();
        let stopped = self.cancel.await_all_stopped(timeout).await;
        if !stopped {
            tracing::warn!(
                remaining = self.cancel.active_count(),
                "Downloads still running after stop timeout"
            );
        }
        stopped
    }

    pub fn shutdown(&self) {
        self.queue().shutdown();
        self.queue_notify.notify_one();
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        self.queue().snapshot()
    }

    pub fn is_idle(&self) -> bool {
        self.queue().is_idle()
    }
}

fn emit_hints(emitter: &dyn DownloadEventEmitterPort, hints: &[String]) {
    let mut lines = hints.iter();
    if let Some(header) = lines.next() {
        emitter.emit(DownloadEvent::warning(header.clone()));
    }
    for line in lines {
        emitter.emit(DownloadEvent::info(line.clone()));
    }
}

#[async_trait]
impl DownloadSchedulerPort for DownloadSchedulerImpl {
    async fn submit(&self, requests: Vec<DownloadRequest>) -> Result<SubmitReport, DownloadError> {
        Self::submit(self, requests)
    }

    async fn enqueue(&self, request: DownloadRequest) -> Result<TaskId, DownloadError> {
        Self::enqueue(self, request)
    }

    async fn request_abort_all(&self) {
        Self::request_abort_all(self);
    }

    async fn resume(&self) {
        Self::resume(self);
    }

    async fn cancel_task(&self, id: &TaskId) -> bool {
        Self::cancel_task(self, id)
    }

    async fn terminate_all(&self) -> usize {
        Self::terminate_all(self)
    }

    async fn stop(&self, timeout: Duration) -> bool {
        Self::stop(self, timeout).await
    }

    async fn shutdown(&self) {
        Self::shutdown(self);
    }

    async fn snapshot(&self) -> QueueSnapshot {
        Self::snapshot(self)
    }

    async fn is_idle(&self) -> bool {
        Self::is_idle(self)
    }
}
