//! Settings domain types and validation.
//!
//! Settings are stored as JSON in `<data_root>/settings.json`. Every field
//! is optional; the `effective_*` accessors apply defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::download::DEFAULT_FORMAT_SELECTOR;
use crate::download::options::DEFAULT_SUBTITLE_LANGUAGES;
use crate::utils::url_normalizer::DEFAULT_ALLOWED_HOSTS;

/// Default size of the worker pool.
pub const DEFAULT_MAX_CONCURRENT_DOWNLOADS: u32 = 3;

/// Default bound on stored history entries.
pub const DEFAULT_HISTORY_MAX_ENTRIES: usize = 1000;

pub const DEFAULT_SOCKET_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_RETRIES: u32 = 15;
pub const DEFAULT_STOP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_EXTRACTOR_PATH: &str = "yt-dlp";
pub const DEFAULT_TRANSCODER_PATH: &str = "ffmpeg";

/// Application settings structure.
///
/// All fields are optional to support partial files and graceful defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory downloads are written into.
    pub default_download_path: Option<String>,

    /// Format selector used when none is given.
    pub default_format: Option<String>,

    /// Worker pool size (1-16).
    pub max_concurrent_downloads: Option<u32>,

    /// History bound (1-100,000).
    pub history_max_entries: Option<usize>,

    /// Extractor socket timeout in seconds.
    pub socket_timeout_secs: Option<u64>,

    /// Extractor retry count (also used for fragment retries).
    pub retries: Option<u32>,

    /// Subtitle languages requested when subtitles are enabled.
    pub subtitle_languages: Option<Vec<String>>,

    /// Proxy used when a request does not specify one.
    pub proxy: Option<String>,

    /// Extractor binary name or path.
    pub extractor_path: Option<String>,

    /// Transcoder binary name or path.
    pub transcoder_path: Option<String>,

    /// How long `stop` waits for workers before giving up.
    pub stop_timeout_secs: Option<u64>,

    /// Hosts accepted by the URL normalizer.
    pub allowed_hosts: Option<Vec<String>>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            default_download_path: None,
            default_format: Some(DEFAULT_FORMAT_SELECTOR.to_string()),
            max_concurrent_downloads: Some(DEFAULT_MAX_CONCURRENT_DOWNLOADS),
            history_max_entries: Some(DEFAULT_HISTORY_MAX_ENTRIES),
            socket_timeout_secs: Some(DEFAULT_SOCKET_TIMEOUT_SECS),
            retries: Some(DEFAULT_RETRIES),
            subtitle_languages: Some(
                DEFAULT_SUBTITLE_LANGUAGES
                    .iter()
                    .map(|s| (*s).to_string())
                    .collect(),
            ),
            proxy: None,
            extractor_path: Some(DEFAULT_EXTRACTOR_PATH.to_string()),
            transcoder_path: Some(DEFAULT_TRANSCODER_PATH.to_string()),
            stop_timeout_secs: Some(DEFAULT_STOP_TIMEOUT_SECS),
            allowed_hosts: None,
        }
    }

    /// Load settings from a JSON file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| SettingsError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(SettingsError::Read {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    pub fn effective_default_format(&self) -> String {
        self.default_format
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_FORMAT_SELECTOR)
            .to_string()
    }

    pub fn effective_max_concurrent_downloads(&self) -> u32 {
        self.max_concurrent_downloads
            .unwrap_or(DEFAULT_MAX_CONCURRENT_DOWNLOADS)
            .max(1)
    }

    pub fn effective_history_max_entries(&self) -> usize {
        self.history_max_entries
            .unwrap_or(DEFAULT_HISTORY_MAX_ENTRIES)
            .max(1)
    }

    pub fn effective_socket_timeout_secs(&self) -> u64 {
        self.socket_timeout_secs
            .unwrap_or(DEFAULT_SOCKET_TIMEOUT_SECS)
    }

    pub fn effective_retries(&self) -> u32 {
        self.retries.unwrap_or(DEFAULT_RETRIES)
    }

    pub fn effective_subtitle_languages(&self) -> Vec<String> {
        match &self.subtitle_languages {
            Some(langs) if !langs.is_empty() => langs.clone(),
            _ => DEFAULT_SUBTITLE_LANGUAGES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    pub fn effective_extractor_path(&self) -> &str {
        self.extractor_path
            .as_deref()
            .unwrap_or(DEFAULT_EXTRACTOR_PATH)
    }

    pub fn effective_transcoder_path(&self) -> &str {
        self.transcoder_path
            .as_deref()
            .unwrap_or(DEFAULT_TRANSCODER_PATH)
    }

    pub fn effective_stop_timeout_secs(&self) -> u64 {
        self.stop_timeout_secs.unwrap_or(DEFAULT_STOP_TIMEOUT_SECS)
    }

    pub fn effective_allowed_hosts(&self) -> Vec<String> {
        match &self.allowed_hosts {
            Some(hosts) if !hosts.is_empty() => hosts.clone(),
            _ => DEFAULT_ALLOWED_HOSTS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// Configured download directory, if any.
    pub fn download_dir(&self) -> Option<PathBuf> {
        self.default_download_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }
}

/// Errors that can occur when loading or validating settings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Max concurrent downloads must be between 1 and 16, got {0}")]
    InvalidConcurrency(u32),

    #[error("History size must be between 1 and 100,000, got {0}")]
    InvalidHistorySize(usize),

    #[error("Socket timeout must be between 1 and 600 seconds, got {0}")]
    InvalidTimeout(u64),

    #[error("Retries must be at most 100, got {0}")]
    InvalidRetries(u32),

    #[error("Download path cannot be empty")]
    EmptyDownloadPath,

    #[error("Proxy must be an http, https or socks URL, got '{0}'")]
    InvalidProxy(String),

    #[error("Failed to read settings from {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse settings in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(workers) = settings.max_concurrent_downloads {
        if !(1..=16).contains(&workers) {
            return Err(SettingsError::InvalidConcurrency(workers));
        }
    }

    if let Some(max) = settings.history_max_entries {
        if !(1..=100_000).contains(&max) {
            return Err(SettingsError::InvalidHistorySize(max));
        }
    }

    if let Some(timeout) = settings.socket_timeout_secs {
        if !(1..=600).contains(&timeout) {
            return Err(SettingsError::InvalidTimeout(timeout));
        }
    }

    if let Some(retries) = settings.retries {
        if retries > 100 {
            return Err(SettingsError::InvalidRetries(retries));
        }
    }

    if settings
        .default_download_path
        .as_ref()
        .is_some_and(|p| p.trim().is_empty())
    {
        return Err(SettingsError::EmptyDownloadPath);
    }

    if let Some(proxy) = &settings.proxy {
        let valid = url::Url::parse(proxy)
            .is_ok_and(|u| matches!(u.scheme(), "http" | "https" | "socks4" | "socks5"));
        if !valid {
            return Err(SettingsError::InvalidProxy(proxy.clone()));
        }
    }

    Ok(())
}
