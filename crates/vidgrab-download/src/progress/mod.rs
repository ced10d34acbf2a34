//! Progress reporting and throttling.
//!
//! Workers publish [`DownloadEvent`](vidgrab_core::DownloadEvent)s through a [`ProgressReporter`]; the UI
//! poll loop drains the matching [`ProgressReceiver`] on a fixed timer.

mod reporter;
mod throttle;

pub use reporter::{ProgressReceiver, ProgressReporter};
pub use throttle::ProgressThrottle;
