//! Queue snapshot DTOs.

use serde::{Deserialize, Serialize};

use super::types::DownloadRequest;

/// A request waiting in the queue, as shown to the UI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedRequest {
    /// Position in the pending list (1 = next to dispatch).
    pub position: u32,
    pub request: DownloadRequest,
}

/// Point-in-time view of the queue.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    /// Pending requests in FIFO order.
    pub pending: Vec<QueuedRequest>,
    /// Number of tasks dispatched in the current batch.
    pub current_index: u32,
    /// Number of tasks submitted in the current batch.
    pub total_tasks: u32,
    /// Workers currently running.
    pub active_count: u32,
    /// Whether the queue has been shut down.
    pub shut_down: bool,
}

impl QueueSnapshot {
    /// Aggregate batch progress: `current_index / total_tasks * 100`.
    #[must_use]
    pub fn aggregate_percent(&self) -> f32 {
        if self.total_tasks == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.current_index as f32 / self.total_tasks as f32;
        (ratio * 100.0).min(100.0)
    }

    /// Number of pending requests.
    #[must_use]
    pub const fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending or running.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.active_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_percent_handles_empty_batch() {
        let snapshot = QueueSnapshot::default();
        assert!(snapshot.aggregate_percent().abs() < f32::EPSILON);
        assert!(snapshot.is_idle());
    }

    #[test]
    fn aggregate_percent_ratio() {
        let snapshot = QueueSnapshot {
            current_index: 3,
            total_tasks: 4,
            ..QueueSnapshot::default()
        };
        assert!((snapshot.aggregate_percent() - 75.0).abs() < f32::EPSILON);
    }
}
