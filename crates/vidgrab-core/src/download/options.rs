//! Options handed to the extractor and the progress ticks it reports back.

use serde::{Deserialize, Serialize};

use super::types::{DEFAULT_FORMAT_SELECTOR, DownloadRequest};

/// Default subtitle languages requested from the extractor.
pub const DEFAULT_SUBTITLE_LANGUAGES: &[&str] = &["en", "zh-Hans", "zh-Hant"];

/// Subtitle options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleOptions {
    pub enabled: bool,
    pub languages: Vec<String>,
}

impl Default for SubtitleOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            languages: DEFAULT_SUBTITLE_LANGUAGES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

/// Options recognized by the extractor for `probe` and `fetch`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorOptions {
    pub proxy: Option<String>,
    pub timeout_secs: u64,
    pub retries: u32,
    pub subtitles: SubtitleOptions,
    /// Format selector (ignored by `probe`).
    pub format: String,
    /// Concurrent fragment downloads.
    pub concurrent_fragments: u32,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout_secs: 60,
            retries: 15,
            subtitles: SubtitleOptions::default(),
            format: DEFAULT_FORMAT_SELECTOR.to_string(),
            concurrent_fragments: 4,
        }
    }
}

impl ExtractorOptions {
    /// Options for downloading `request`, starting from `base` for the
    /// network settings and language list.
    #[must_use]
    pub fn for_request(base: &Self, request: &DownloadRequest) -> Self {
        Self {
            proxy: request.proxy.clone(),
            timeout_secs: base.timeout_secs,
            retries: base.retries,
            subtitles: SubtitleOptions {
                enabled: request.download_subtitles,
                languages: base.subtitles.languages.clone(),
            },
            format: request.format_id.clone(),
            concurrent_fragments: request.concurrency_hint.max(1),
        }
    }

    /// Replace the proxy.
    #[must_use]
    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }
}

/// Status reported with each extractor progress tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Downloading,
    Finished,
}

/// One progress tick from the extractor, in its display form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchProgress {
    pub status: FetchStatus,
    /// e.g. `" 42.5%"`.
    pub percent_text: String,
    /// e.g. `"1.20MiB/s"`.
    pub speed_text: String,
    /// e.g. `"00:10"`.
    pub eta_text: String,
}

impl FetchProgress {
    /// A `downloading` tick.
    pub fn downloading(
        percent_text: impl Into<String>,
        speed_text: impl Into<String>,
        eta_text: impl Into<String>,
    ) -> Self {
        Self {
            status: FetchStatus::Downloading,
            percent_text: percent_text.into(),
            speed_text: speed_text.into(),
            eta_text: eta_text.into(),
        }
    }

    /// A `finished` tick.
    #[must_use]
    pub fn finished() -> Self {
        Self {
            status: FetchStatus::Finished,
            percent_text: "100%".to_string(),
            speed_text: String::new(),
            eta_text: String::new(),
        }
    }

    /// Numeric percentage parsed from `percent_text`.
    ///
    /// `finished` ticks are always 100. Unparseable text yields `None`.
    #[must_use]
    pub fn percent(&self) -> Option<f32> {
        if self.status == FetchStatus::Finished {
            return Some(100.0);
        }
        self.percent_text
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse::<f32>()
            .ok()
            .map(|p| p.clamp(0.0, 100.0))
    }
}

/// Returned by the progress callback to tell the extractor whether to go on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressControl {
    Continue,
    /// Stop the download at this tick.
    Abort,
}
