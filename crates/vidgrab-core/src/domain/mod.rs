//! Core domain types.
//!
//! These types represent the pure domain model, independent of any
//! infrastructure concerns (processes, filesystem, etc.).
//!
//! # Structure
//!
//! - `format` - Typed encoding descriptors (`FormatDescriptor`, `FileSize`)
//! - `video` - Video metadata (`VideoInfo`) and the extractor JSON boundary
//! - `history` - Completed download records (`HistoryEntry`)

mod format;
mod history;
mod video;

pub use format::{FileSize, FormatDescriptor};
pub use history::{HISTORY_TIMESTAMP_FORMAT, HistoryEntry};
pub use video::{RawFormat, RawVideoInfo, VideoInfo};
