//! CLI-specific error types and mappings.
//!
//! Maps domain errors to exit codes and user-facing messages.

use thiserror::Error;

use vidgrab_core::download::DownloadError;
use vidgrab_core::paths::PathError;
use vidgrab_core::settings::SettingsError;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// A download or probe failed.
    #[error("{0}")]
    Download(String),

    /// Argument or input error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required external tool is not installed.
    #[error("{0}")]
    MissingDependency(String),

    /// Some tasks of a batch failed.
    #[error("{failed} of {total} downloads failed")]
    BatchFailed { failed: usize, total: usize },

    /// The user interrupted the run.
    #[error("Interrupted")]
    Interrupted,
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    /// - 130: Terminated by Ctrl-C
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Download(_) | Self::BatchFailed { .. } => 1,
            Self::Arguments(_) => 2,         // EX_USAGE
            Self::MissingDependency(_) => 69, // EX_UNAVAILABLE
            Self::Io(_) => 74,               // EX_IOERR
            Self::Config(_) => 78,           // EX_CONFIG
            Self::Interrupted => 130,
        }
    }
}

impl From<DownloadError> for CliError {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::InvalidUrl { .. } => Self::Arguments(err.user_message()),
            DownloadError::MissingDependency { .. } => Self::MissingDependency(err.user_message()),
            DownloadError::Io { .. } => Self::Io(err.user_message()),
            DownloadError::Cancelled => Self::Interrupted,
            _ => Self::Download(err.user_message()),
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
