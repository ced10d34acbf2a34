//! Errors from resolving vidgrab's data and download directories.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("No per-user data directory on this platform; set VIDGRAB_DATA_DIR")]
    NoDataDir,

    /// Neither a platform download directory nor a home directory exists.
    #[error("No download directory on this platform; pass --output or set default_download_path")]
    NoDownloadDir,

    #[error("{} exists but is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// Missing, and the caller asked not to create it.
    #[error("Directory {} does not exist", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("Could not create {}: {source}", path.display())]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write to {}: {source}", path.display())]
    NotWritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
