//! Cancellation controller.
//!
//! Two granularities:
//!
//! - The **abort flag** is cooperative. The consumer loop stops dispatching
//!   and workers check it inside the progress callback and right after the
//!   extractor returns. An in-flight network read inside the extractor is
//!   not interrupted until its next progress tick.
//! - The **per-task token** is hard. The worker races the extractor future
//!   against it; dropping the future kills the child process.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use vidgrab_core::download::TaskId;

#[derive(Debug, Default)]
struct AbortState {
    set: AtomicBool,
    /// Bumped every time a set flag is cleared.
    generation: AtomicU64,
}

/// Shared, resettable abort flag.
///
/// Clearing the flag starts a new generation. Work started under an older
/// generation stays aborted, so a reset only releases work dispatched after
/// it.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AbortState>);

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.0.set.load(Ordering::SeqCst)
    }

    pub fn set(&self) {
        self.0.set.store(true, Ordering::SeqCst);
    }

    /// Clear the flag. A no-op when it is not set.
    pub fn clear(&self) {
        if self.is_set() {
            // Bump first so readers never see a cleared flag with a stale
            // generation.
            self.0.generation.fetch_add(1, Ordering::SeqCst);
            self.0.set.store(false, Ordering::SeqCst);
        }
    }

    /// Current generation, captured by work at dispatch.
    pub fn generation(&self) -> u64 {
        self.0.generation.load(Ordering::SeqCst)
    }

    /// Generation to dispatch new work under, or `None` while aborted or
    /// mid-reset.
    pub fn live_generation(&self) -> Option<u64> {
        let generation = self.generation();
        let set = self.is_set();
        (!set && self.generation() == generation).then_some(generation)
    }

    /// Whether work dispatched at `generation` must stop: the flag is set
    /// now, or it was set and cleared since.
    pub fn aborted_since(&self, generation: u64) -> bool {
        self.generation() != generation || self.is_set()
    }
}

/// Registry-side handle to one running task.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    cancel: CancellationToken,
    finished: watch::Receiver<bool>,
}

/// Worker-side half of a [`TaskHandle`].
///
/// Marks the task finished when [`complete`](Self::complete) is called or
/// when dropped, whichever comes first.
#[derive(Debug)]
pub struct TaskCompletion {
    cancel: CancellationToken,
    finished: watch::Sender<bool>,
}

impl TaskHandle {
    /// Create a linked handle/completion pair.
    pub fn new() -> (Self, TaskCompletion) {
        let cancel = CancellationToken::new();
        let (tx, rx) = watch::channel(false);
        (
            Self {
                cancel: cancel.clone(),
                finished: rx,
            },
            TaskCompletion {
                cancel,
                finished: tx,
            },
        )
    }

    /// Signal hard cancellation.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the worker reported a terminal state.
    pub fn is_finished(&self) -> bool {
        *self.finished.borrow()
    }

    /// Wait until the worker reports a terminal state or goes away.
    async fn wait_finished(&mut self) {
        // A closed channel means the worker dropped its completion.
        let _ = self.finished.wait_for(|done| *done).await;
    }
}

impl TaskCompletion {
    /// Token the worker races its work against.
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether hard cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Report a terminal state.
    pub fn complete(self) {
        drop(self);
    }
}

impl Drop for TaskCompletion {
    fn drop(&mut self) {
        let _ = self.finished.send(true);
    }
}

/// Abort flag plus a registry of in-flight task handles.
#[derive(Debug, Default)]
pub struct CancellationController {
    abort: AbortFlag,
    tasks: Mutex<HashMap<TaskId, TaskHandle>>,
}

impl CancellationController {
    pub fn new() -> Self {
        Self::default()
    }

    fn tasks(&self) -> std::sync::MutexGuard<'_, HashMap<TaskId, TaskHandle>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the shared abort flag.
    pub fn request_abort_all(&self) {
        self.abort.set();
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.is_set()
    }

    /// Clear the abort flag so new work can run.
    pub fn reset(&self) {
        self.abort.clear();
    }

    /// Cheap clone of the flag for workers.
    pub fn abort_flag(&self) -> AbortFlag {
        self.abort.clone()
    }

    pub fn register(&self, id: TaskId, handle: TaskHandle) {
        self.tasks().insert(id, handle);
    }

    pub fn unregister(&self, id: &TaskId) {
        self.tasks().remove(id);
    }

    /// Hard-cancel one task. Returns `false` if it is not registered.
    pub fn cancel_task(&self, id: &TaskId) -> bool {
        let tasks = self.tasks();
        let Some(handle) = tasks.get(id) else {
            return false;
        };
        handle.cancel();
        true
    }

    /// Hard-cancel every registered task. Returns how many were signalled.
    pub fn terminate_all(&self) -> usize {
        let tasks = self.tasks();
        for handle in tasks.values() {
            handle.cancel();
        }
        tasks.len()
    }

    /// Number of registered tasks that have not finished.
    pub fn active_count(&self) -> usize {
        self.tasks().values().filter(|h| !h.is_finished()).count()
    }

    /// Wait until every registered task reports a terminal state, or until
    /// `timeout` elapses.
    ///
    /// Returns `true` if all tasks stopped in time. On timeout the caller
    /// proceeds anyway.
    pub async fn await_all_stopped(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let handles: Vec<TaskHandle> = self.tasks().values().cloned().collect();

        for mut handle in handles {
            if tokio::time::timeout_at(deadline, handle.wait_finished())
                .await
                .is_err()
            {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abort_flag_is_shared_and_resettable() {
        let controller = CancellationController::new();
        let flag = controller.abort_flag();
        assert!(!flag.is_set());

        controller.request_abort_all();
        assert!(flag.is_set());
        assert!(controller.is_aborted());

        controller.reset();
        assert!(!flag.is_set());
    }

    #[test]
    fn test_reset_keeps_older_work_aborted() {
        let flag = AbortFlag::new();
        let before = flag.generation();
        assert!(!flag.aborted_since(before));

        // Clearing an unset flag starts no new generation.
        flag.clear();
        assert!(!flag.aborted_since(before));

        flag.set();
        assert!(flag.aborted_since(before));
        flag.clear();
        assert!(!flag.is_set());
        assert!(flag.aborted_since(before));

        let after = flag.generation();
        assert_ne!(before, after);
        assert!(!flag.aborted_since(after));
    }

    #[test]
    fn test_live_generation_is_none_while_aborted() {
        let flag = AbortFlag::new();
        assert_eq!(flag.live_generation(), Some(flag.generation()));
        flag.set();
        assert_eq!(flag.live_generation(), None);
        flag.clear();
        assert_eq!(flag.live_generation(), Some(flag.generation()));
    }

    #[test]
    fn test_cancel_task_signals_token() {
        let controller = CancellationController::new();
        let id = TaskId::from_raw("t1");
        let (handle, completion) = TaskHandle::new();
        controller.register(id.clone(), handle);

        assert!(!completion.is_cancelled());
        assert!(controller.cancel_task(&id));
        assert!(completion.is_cancelled());
        assert!(!controller.cancel_task(&TaskId::from_raw("missing")));
    }

    #[test]
    fn test_terminate_all_counts() {
        let controller = CancellationController::new();
        let mut completions = Vec::new();
        for i in 0..3 {
            let (handle, completion) = TaskHandle::new();
            controller.register(TaskId::from_raw(format!("t{i}")), handle);
            completions.push(completion);
        }
        assert_eq!(controller.terminate_all(), 3);
        assert!(completions.iter().all(TaskCompletion::is_cancelled));
    }

    #[test]
    fn test_active_count_ignores_finished() {
        let controller = CancellationController::new();
        let (handle, completion) = TaskHandle::new();
        controller.register(TaskId::from_raw("t"), handle);
        assert_eq!(controller.active_count(), 1);
        completion.complete();
        assert_eq!(controller.active_count(), 0);
    }

    #[tokio::test]
    async fn test_await_all_stopped_returns_when_done() {
        let controller = Arc::new(CancellationController::new());
        let (handle, completion) = TaskHandle::new();
        controller.register(TaskId::from_raw("t"), handle);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            completion.complete();
        });

        assert!(controller.await_all_stopped(Duration::from_secs(5)).await);
    }

    #[tokio::test]
    async fn test_await_all_stopped_times_out() {
        let controller = CancellationController::new();
        let (handle, _completion) = TaskHandle::new();
        controller.register(TaskId::from_raw("t"), handle);

        assert!(
            !controller
                .await_all_stopped(Duration::from_millis(30))
                .await
        );
    }

    #[tokio::test]
    async fn test_await_all_stopped_with_no_tasks() {
        let controller = CancellationController::new();
        assert!(controller.await_all_stopped(Duration::from_millis(1)).await);
    }
}
