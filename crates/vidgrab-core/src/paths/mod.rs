//! Path utilities for vidgrab data directories.
//!
//! - Settings file location
//! - History file location
//! - Default download directory
//!
//! No interactive/terminal I/O here; adapters handle prompts separately.

mod ensure;
mod error;
mod platform;

pub use ensure::{DirectoryCreationStrategy, ensure_directory, verify_writable};
pub use error::PathError;
pub use platform::{data_root, default_download_dir, history_path, settings_path};
