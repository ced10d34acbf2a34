//! Download error types.
//!
//! These errors are serializable and do not depend on external error types
//! like `std::io::Error`. For I/O errors, we capture the kind and message as
//! strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of failure categories for extractor errors.
///
/// The extractor is a black-box subprocess, so [`FailureCategory::classify`]
/// derives the category from its diagnostic text. This is a best-effort
/// classification, not a guarantee.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// The remote end (or the proxy) refused the connection.
    ConnectionRefused,
    /// A network operation timed out.
    TimedOut,
    /// The platform answered with HTTP 403 or a comparable restriction.
    Forbidden,
    /// The extractor needed a helper tool (ffmpeg) it could not find.
    MissingDependency,
    /// Anything else.
    Other,
}

/// yt-dlp phrasings for an absent ffmpeg. Other lines merely mention it.
const MISSING_FFMPEG: [&str; 3] = [
    "ffmpeg not found",
    "ffmpeg is not installed",
    "ffmpeg could not be found",
];

impl FailureCategory {
    /// Classify extractor diagnostic text.
    #[must_use]
    pub fn classify(text: &str) -> Self {
        let lower = text.to_ascii_lowercase();
        if lower.contains("connection refused") || lower.contains("unable to download api page")
        {
            Self::ConnectionRefused
        } else if lower.contains("timed out") || lower.contains("timeout") {
            Self::TimedOut
        } else if lower.contains("http error 403") || lower.contains("403 forbidden") {
            Self::Forbidden
        } else if MISSING_FFMPEG.iter().any(|p| lower.contains(p)) {
            Self::MissingDependency
        } else {
            Self::Other
        }
    }

    /// Whether this category points at the network path (direct or proxied).
    #[must_use]
    pub const fn is_network_or_proxy(self) -> bool {
        matches!(self, Self::ConnectionRefused | Self::TimedOut | Self::Forbidden)
    }
}

/// Error type for download operations.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum DownloadError {
    /// URL was empty, malformed, or not on an allowed host.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending input.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The extractor failed during probe or fetch.
    #[error("Extraction failed: {message}")]
    ExtractionFailed {
        /// Last meaningful diagnostic line from the extractor.
        message: String,
        /// Heuristic category used to pick remediation hints.
        category: FailureCategory,
    },

    /// A required external tool is not installed.
    #[error("Missing dependency: {tool} was not found on PATH")]
    MissingDependency {
        /// Tool name (e.g. `ffmpeg`).
        tool: String,
    },

    /// The transcoder exited non-zero.
    #[error("Transcode failed (exit code {exit_code:?}): {diagnostics}")]
    TranscodeFailed {
        /// Exit code, if the process exited normally.
        #[serde(skip_serializing_if = "Option::is_none")]
        exit_code: Option<i32>,
        /// Captured stderr tail.
        diagnostics: String,
    },

    /// Writing the history file failed.
    #[error("Failed to persist history: {message}")]
    HistoryPersistFailed {
        /// Detailed error message.
        message: String,
    },

    /// The queue no longer accepts work.
    #[error("Download queue has been shut down")]
    QueueShutDown,

    /// Task was cancelled (abort flag or explicit cancel).
    #[error("Download cancelled")]
    Cancelled,

    /// I/O error during file operations.
    #[error("I/O error ({kind}): {message}")]
    Io {
        /// The kind of I/O error (e.g., "`NotFound`").
        kind: String,
        /// Detailed error message.
        message: String,
    },

    /// General/uncategorized error.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl DownloadError {
    /// Create an invalid URL error.
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create an extraction error, classifying the message.
    pub fn extraction_failed(message: impl Into<String>) -> Self {
        let message = message.into();
        let category = FailureCategory::classify(&message);
        Self::ExtractionFailed { message, category }
    }

    /// Create a missing dependency error.
    pub fn missing_dependency(tool: impl Into<String>) -> Self {
        Self::MissingDependency { tool: tool.into() }
    }

    /// Create a transcode failure.
    pub fn transcode_failed(exit_code: Option<i32>, diagnostics: impl Into<String>) -> Self {
        Self::TranscodeFailed {
            exit_code,
            diagnostics: diagnostics.into(),
        }
    }

    /// Create a history persistence error.
    pub fn history_persist_failed(message: impl Into<String>) -> Self {
        Self::HistoryPersistFailed {
            message: message.into(),
        }
    }

    /// Create an I/O error from kind and message strings.
    pub fn io(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error from a `std::io::Error`.
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        let kind = err.kind();
        Self::Io {
            kind: format!("{kind:?}"),
            message: err.to_string(),
        }
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this is a cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The `NetworkOrProxyFailed` sub-classification of extraction errors.
    #[must_use]
    pub const fn is_network_or_proxy(&self) -> bool {
        match self {
            Self::ExtractionFailed { category, .. } => category.is_network_or_proxy(),
            _ => false,
        }
    }

    /// One-line message suitable for the terminal log line of a failed task.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidUrl { url, reason } => format!("Invalid URL {url}: {reason}"),
            Self::ExtractionFailed { category, message } => match category {
                FailureCategory::ConnectionRefused => {
                    "Download failed: could not connect to the video platform".to_string()
                }
                FailureCategory::TimedOut => "Download failed: connection timed out".to_string(),
                FailureCategory::Forbidden => {
                    "Download failed: the platform refused the request, likely a network restriction or missing proxy"
                        .to_string()
                }
                FailureCategory::MissingDependency => {
                    "Download failed: ffmpeg is required but not installed".to_string()
                }
                FailureCategory::Other => format!("Download failed: {message}"),
            },
            Self::MissingDependency { tool } => {
                format!("Download failed: {tool} is required but was not found on PATH")
            }
            Self::TranscodeFailed { exit_code, .. } => match exit_code {
                Some(code) => format!("Transcode failed with exit code {code}"),
                None => "Transcode failed: transcoder was terminated".to_string(),
            },
            Self::HistoryPersistFailed { message } => {
                format!("Could not save download history: {message}")
            }
            Self::QueueShutDown => "The download queue is shut down".to_string(),
            Self::Cancelled => "Download cancelled".to_string(),
            Self::Io { message, .. } => format!("File error: {message}"),
            Self::Other { message } => format!("Download failed: {message}"),
        }
    }

    /// Remediation hint lines for a failed task.
    ///
    /// The first line is a header, the rest are steps. Empty when there is
    /// nothing useful to suggest.
    #[must_use]
    pub fn remediation_hints(&self, proxy_in_use: bool) -> Vec<String> {
        let hints: &[&str] = match self {
            Self::ExtractionFailed { category, .. } => match (category, proxy_in_use) {
                (FailureCategory::ConnectionRefused, true) => &[
                    "Proxy connection failed. Suggestions:",
                    "1. Check that the proxy software is running",
                    "2. Verify the proxy address and port",
                    "3. Try again without a proxy",
                ],
                (FailureCategory::ConnectionRefused, false) => &[
                    "Direct connection failed. Suggestions:",
                    "1. Check your network connection",
                    "2. The platform may be blocked on this network; try a proxy",
                ],
                (FailureCategory::TimedOut, _) => &[
                    "The connection timed out. Suggestions:",
                    "1. Check your network connection",
                    "2. Retry later",
                ],
                (FailureCategory::Forbidden, true) => &[
                    "Access was refused. Suggestions:",
                    "1. Switch to a different proxy node",
                    "2. Update the extractor to the latest version",
                ],
                (FailureCategory::Forbidden, false) => &[
                    "Access was refused. Suggestions:",
                    "1. The network may restrict the platform; try a proxy",
                    "2. Update the extractor to the latest version",
                ],
                (FailureCategory::MissingDependency, _) => &[
                    "ffmpeg is needed to merge separate video and audio streams:",
                    "1. Install ffmpeg and make sure it is on PATH",
                    "2. Or choose a single combined format",
                ],
                (FailureCategory::Other, _) => &[],
            },
            Self::MissingDependency { tool } if tool == "ffmpeg" => &[
                "ffmpeg is needed for merging or transcoding:",
                "1. Install ffmpeg and make sure it is on PATH",
                "2. Or choose a single combined format",
            ],
            Self::MissingDependency { .. } => &[
                "Install the missing tool and make sure it is on PATH",
            ],
            _ => &[],
        };
        hints.iter().map(|s| (*s).to_string()).collect()
    }
}

/// Result type alias for download operations.
pub type DownloadResult<T> = Result<T, DownloadError>;
