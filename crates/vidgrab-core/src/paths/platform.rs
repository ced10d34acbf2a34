//! Data root and well-known file locations.

use std::env;
use std::fs;
use std::path::PathBuf;

use super::error::PathError;

const SETTINGS_FILE: &str = "settings.json";
const HISTORY_FILE: &str = "download_history.json";

/// Root directory for vidgrab's own files (settings, history).
///
/// Resolution order:
/// 1. `VIDGRAB_DATA_DIR` environment variable
/// 2. System data directory (e.g., `~/.local/share/vidgrab`)
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Ok(path) = env::var("VIDGRAB_DATA_DIR") {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let data_dir = dirs::data_local_dir().ok_or(PathError::NoDataDir)?;
    let root = data_dir.join("vidgrab");

    if !root.exists() {
        fs::create_dir_all(&root).map_err(|source| PathError::CreateFailed {
            path: root.clone(),
            source,
        })?;
    }

    Ok(root)
}

/// Location of `settings.json`.
pub fn settings_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(SETTINGS_FILE))
}

/// Location of `download_history.json`.
pub fn history_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(HISTORY_FILE))
}

/// Directory downloads go to when neither settings nor flags name one.
///
/// The platform download directory, else `~/Downloads`.
pub fn default_download_dir() -> Result<PathBuf, PathError> {
    if let Some(dir) = dirs::download_dir() {
        return Ok(dir);
    }
    let home = dirs::home_dir().ok_or(PathError::NoDownloadDir)?;
    Ok(home.join("Downloads"))
}
