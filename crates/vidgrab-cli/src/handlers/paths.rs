//! Paths command handler.
//!
//! Displays all resolved paths for diagnostics and debugging.

use vidgrab_core::paths::{data_root, default_download_dir, history_path, settings_path};
use vidgrab_core::settings::Settings;

use crate::error::CliError;

/// Execute the paths command.
///
/// Prints `key = value` lines. The download directory honours the settings
/// file when it can be read.
pub fn execute() -> Result<(), CliError> {
    let settings_file = settings_path()?;
    let configured = match Settings::load_from(&settings_file) {
        Ok(settings) => settings.download_dir(),
        Err(e) => {
            tracing::warn!(error = %e, "Settings unreadable; showing default download directory");
            None
        }
    };
    let download_dir = match configured {
        Some(dir) => dir,
        None => default_download_dir()?,
    };

    println!("data_root = {}", data_root()?.display());
    println!("settings = {}", settings_file.display());
    println!("history = {}", history_path()?.display());
    println!("downloads = {}", download_dir.display());
    Ok(())
}
