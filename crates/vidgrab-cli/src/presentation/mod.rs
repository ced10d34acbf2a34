//! Shared CLI presentation utilities.
//!
//! Keep this module format-only: no domain transforms.

pub mod events;
pub mod tables;

pub use events::{EventView, log_line, render_event, timestamp};
pub use tables::{format_optional, print_separator, truncate_string};
