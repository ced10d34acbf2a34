//! Rendering of scheduler events for the terminal.

use chrono::{Local, NaiveTime};

use vidgrab_core::download::{DownloadEvent, EventLevel, TaskId};

/// What the download view should do with an event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventView {
    /// Print a log line above the progress bar.
    Line(String),
    /// Update the per-task status message.
    Progress { task_id: TaskId, message: String },
    /// Update the aggregate bar.
    Batch {
        current_index: u32,
        total_tasks: u32,
        percent: f32,
    },
    /// Nothing to show.
    Skip,
}

/// Current local wall-clock time.
pub fn timestamp() -> NaiveTime {
    Local::now().time()
}

const fn level_tag(level: EventLevel) -> &'static str {
    match level {
        EventLevel::Info => "",
        EventLevel::Success => "OK ",
        EventLevel::Warning => "WARN ",
        EventLevel::Error => "ERROR ",
    }
}

/// Format a log line as `[HH:MM:SS] <tag>message`.
pub fn log_line(at: NaiveTime, level: EventLevel, message: &str) -> String {
    format!("[{}] {}{message}", at.format("%H:%M:%S"), level_tag(level))
}

/// Map an event to its view, stamping log lines with `at`.
pub fn render_event(event: &DownloadEvent, at: NaiveTime) -> EventView {
    if let Some((level, message)) = event.log_line() {
        return EventView::Line(log_line(at, level, message));
    }
    match event {
        DownloadEvent::Progress {
            task_id,
            percent,
            speed,
            eta,
        } => {
            let mut parts = vec![format!("{percent:>5.1}%")];
            if !speed.is_empty() {
                parts.push(format!("at {speed}"));
            }
            if !eta.is_empty() {
                parts.push(format!("ETA {eta}"));
            }
            EventView::Progress {
                task_id: task_id.clone(),
                message: parts.join(" "),
            }
        }
        DownloadEvent::BatchProgress {
            current_index,
            total_tasks,
            percent,
        } => EventView::Batch {
            current_index: *current_index,
            total_tasks: *total_tasks,
            percent: *percent,
        },
        _ => EventView::Skip,
    }
}
