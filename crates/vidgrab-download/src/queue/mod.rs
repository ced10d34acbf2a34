//! Download queue management.
//!
//! A pure state machine for the pending queue and batch counters. No I/O is
//! performed here; the scheduler handles locking, events, and dispatch.
//!
//! # Design
//!
//! - Pure synchronous state machine (no async, no IO, no tracing)
//! - `active` is tracked here so idleness is decided under the same lock as
//!   dequeueing
//!
//! # Batch Counters
//!
//! - `total_tasks` counts requests enqueued since the last `begin_batch`
//! - `current_index` counts requests dispatched since the last `begin_batch`

// Queue sizes are always well under u32::MAX in practice
#![allow(clippy::cast_possible_truncation)]

mod types;

use std::collections::VecDeque;

use vidgrab_core::download::{DownloadError, QueueSnapshot, QueuedRequest, TaskId};

pub use types::QueuedItem;

/// Manages pending requests and batch counters.
///
/// This is a sync type with no internal locking; the caller is responsible
/// for synchronization.
#[derive(Debug, Default)]
pub struct DownloadQueue {
    pending: VecDeque<QueuedItem>,
    current_index: u32,
    total_tasks: u32,
    active: u32,
    shut_down: bool,
}

impl DownloadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pending items.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of dispatched items that have not finished.
    pub const fn active_count(&self) -> u32 {
        self.active
    }

    pub const fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Whether a request for `url` is already pending.
    pub fn contains_url(&self, url: &str) -> bool {
        self.pending.iter().any(|item| item.request.url == url)
    }

    /// Append to the tail. Returns the 1-based position.
    pub fn enqueue(&mut self, item: QueuedItem) -> Result<u32, DownloadError> {
        if self.shut_down {
            return Err(DownloadError::QueueShutDown);
        }
        self.pending.push_back(item);
        self.total_tasks = self.total_tasks.saturating_add(1);
        Ok(self.pending.len() as u32)
    }

    /// Pop the head and count it as dispatched and active.
    pub fn dequeue(&mut self) -> Option<QueuedItem> {
        let item = self.pending.pop_front()?;
        self.current_index = self.current_index.saturating_add(1);
        self.active = self.active.saturating_add(1);
        Some(item)
    }

    /// Mark one dispatched item as finished.
    pub const fn finish(&mut self) {
        self.active = self.active.saturating_sub(1);
    }

    /// Discard every pending item, returning them in FIFO order.
    ///
    /// The batch total shrinks to what was actually dispatched.
    pub fn drain(&mut self) -> Vec<QueuedItem> {
        let drained: Vec<QueuedItem> = self.pending.drain(..).collect();
        self.total_tasks = self.current_index;
        drained
    }

    /// Remove one pending item by id.
    pub fn remove(&mut self, id: &TaskId) -> Option<QueuedItem> {
        let pos = self.pending.iter().position(|item| &item.id == id)?;
        let item = self.pending.remove(pos)?;
        self.total_tasks = self.total_tasks.saturating_sub(1);
        Some(item)
    }

    /// Reset batch counters. Only takes effect when idle.
    pub fn begin_batch(&mut self) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.current_index = 0;
        self.total_tasks = 0;
        true
    }

    /// Nothing pending and nothing running.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.active == 0
    }

    /// Reject all future enqueues.
    pub const fn shutdown(&mut self) {
        self.shut_down = true;
    }

    /// Batch counters `(current_index, total_tasks)`.
    pub const fn batch_counters(&self) -> (u32, u32) {
        (self.current_index, self.total_tasks)
    }

    /// Point-in-time view for the UI.
    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            pending: self
                .pending
                .iter()
                .enumerate()
                .map(|(i, item)| QueuedRequest {
                    position: i as u32 + 1,
                    request: item.request.clone(),
                })
                .collect(),
            current_index: self.current_index,
            total_tasks: self.total_tasks,
            active_count: self.active,
            shut_down: self.shut_down,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidgrab_core::download::DownloadRequest;

    fn item(url: &str) -> QueuedItem {
        QueuedItem::new(DownloadRequest::new(url, "/tmp"))
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = DownloadQueue::new();
        assert_eq!(queue.enqueue(item("a")).unwrap(), 1);
        assert_eq!(queue.enqueue(item("b")).unwrap(), 2);
        assert_eq!(queue.enqueue(item("c")).unwrap(), 3);

        let order: Vec<String> = std::iter::from_fn(|| queue.dequeue())
            .map(|i| i.request.url)
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_counters_track_dispatch() {
        let mut queue = DownloadQueue::new();
        queue.enqueue(item("a")).unwrap();
        queue.enqueue(item("b")).unwrap();

        queue.dequeue().unwrap();
        assert_eq!(queue.batch_counters(), (1, 2));
        assert_eq!(queue.active_count(), 1);
        assert!(!queue.is_idle());

        queue.finish();
        assert_eq!(queue.active_count(), 0);
        assert!(!queue.is_idle());

        queue.dequeue().unwrap();
        queue.finish();
        assert!(queue.is_idle());
        assert!((queue.snapshot().aggregate_percent() - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut queue = DownloadQueue::new();
        for url in ["a", "b", "c"] {
            queue.enqueue(item(url)).unwrap();
        }
        let drained = queue.drain();
        assert_eq!(drained.len(), 3);
        assert_eq!(queue.pending_len(), 0);
        assert_eq!(queue.batch_counters(), (0, 0));
        assert!(queue.is_idle());
    }

    #[test]
    fn test_shutdown_rejects_enqueue() {
        let mut queue = DownloadQueue::new();
        queue.shutdown();
        let result = queue.enqueue(item("a"));
        assert!(matches!(result, Err(DownloadError::QueueShutDown)));
        assert!(queue.snapshot().shut_down);
    }

    #[test]
    fn test_begin_batch_only_when_idle() {
        let mut queue = DownloadQueue::new();
        queue.enqueue(item("a")).unwrap();
        queue.dequeue().unwrap();
        assert!(!queue.begin_batch());
        assert_eq!(queue.batch_counters(), (1, 1));

        queue.finish();
        assert!(queue.begin_batch());
        assert_eq!(queue.batch_counters(), (0, 0));
    }

    #[test]
    fn test_remove_and_contains() {
        let mut queue = DownloadQueue::new();
        let first = item("a");
        let id = first.id.clone();
        queue.enqueue(first).unwrap();
        queue.enqueue(item("b")).unwrap();

        assert!(queue.contains_url("a"));
        assert_eq!(queue.remove(&id).unwrap().request.url, "a");
        assert!(!queue.contains_url("a"));
        assert!(queue.remove(&id).is_none());

        let snapshot = queue.snapshot();
        assert_eq!(snapshot.pending.len(), 1);
        assert_eq!(snapshot.pending[0].position, 1);
        assert_eq!(snapshot.total_tasks, 1);
    }

    #[test]
    fn test_finish_never_underflows() {
        let mut queue = DownloadQueue::new();
        queue.finish();
        assert_eq!(queue.active_count(), 0);
    }
}
