//! Download events - discriminated union carried from workers to the UI.

use serde::{Deserialize, Serialize};

use super::types::{TaskId, TaskState};

/// Severity of a log-style event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Single discriminated union for all events published by the scheduler
/// and its workers.
///
/// Serialized with a `type` tag:
///
/// ```json
/// { "type": "info", "message": "Fetching video information..." }
/// { "type": "progress", "task_id": "1700000000000-0", "percent": 42.5, "speed": "1.2MiB/s", "eta": "00:10" }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DownloadEvent {
    /// Informational log line.
    Info { message: String },

    /// A task finished successfully.
    Success { message: String },

    /// Something noteworthy that did not fail the task.
    Warning { message: String },

    /// A task failed.
    Error { message: String },

    /// Progress tick for one task.
    Progress {
        task_id: TaskId,
        /// Progress percentage (0.0 - 100.0).
        percent: f32,
        speed: String,
        eta: String,
    },

    /// Read-only snapshot of a task's state after a status change.
    TaskStatus { snapshot: TaskState },

    /// Aggregate batch progress (one tick per dispatched task).
    BatchProgress {
        current_index: u32,
        total_tasks: u32,
        percent: f32,
    },
}

impl DownloadEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self::Info {
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::Success {
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Create a progress event.
    pub fn progress(
        task_id: TaskId,
        percent: f32,
        speed: impl Into<String>,
        eta: impl Into<String>,
    ) -> Self {
        Self::Progress {
            task_id,
            percent,
            speed: speed.into(),
            eta: eta.into(),
        }
    }

    /// Create a batch progress event from queue counters.
    #[must_use]
    pub fn batch_progress(current_index: u32, total_tasks: u32) -> Self {
        let percent = if total_tasks == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let ratio = current_index as f32 / total_tasks as f32;
            (ratio * 100.0).min(100.0)
        };
        Self::BatchProgress {
            current_index,
            total_tasks,
            percent,
        }
    }

    /// Get the event type as a string.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Info { .. } => "info",
            Self::Success { .. } => "success",
            Self::Warning { .. } => "warning",
            Self::Error { .. } => "error",
            Self::Progress { .. } => "progress",
            Self::TaskStatus { .. } => "task_status",
            Self::BatchProgress { .. } => "batch_progress",
        }
    }

    /// Level and text for log-style events, `None` for structured ones.
    #[must_use]
    pub fn log_line(&self) -> Option<(EventLevel, &str)> {
        match self {
            Self::Info { message } => Some((EventLevel::Info, message)),
            Self::Success { message } => Some((EventLevel::Success, message)),
            Self::Warning { message } => Some((EventLevel::Warning, message)),
            Self::Error { message } => Some((EventLevel::Error, message)),
            _ => None,
        }
    }

    /// Task this event concerns, if any.
    #[must_use]
    pub const fn task_id(&self) -> Option<&TaskId> {
        match self {
            Self::Progress { task_id, .. } => Some(task_id),
            Self::TaskStatus { snapshot } => Some(&snapshot.id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization() {
        let event = DownloadEvent::progress(TaskId::from_raw("1-0"), 42.5, "1MiB/s", "00:10");
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"progress\""));
        assert!(json.contains("\"task_id\":\"1-0\""));
    }

    #[test]
    fn batch_progress_percent() {
        let DownloadEvent::BatchProgress { percent, .. } = DownloadEvent::batch_progress(1, 4)
        else {
            panic!("expected batch progress");
        };
        assert!((percent - 25.0).abs() < f32::EPSILON);

        let DownloadEvent::BatchProgress { percent, .. } = DownloadEvent::batch_progress(0, 0)
        else {
            panic!("expected batch progress");
        };
        assert!(percent.abs() < f32::EPSILON);
    }

    #[test]
    fn log_lines_only_for_log_events() {
        assert_eq!(
            DownloadEvent::warning("careful").log_line(),
            Some((EventLevel::Warning, "careful"))
        );
        assert!(DownloadEvent::batch_progress(1, 1).log_line().is_none());
    }
}
