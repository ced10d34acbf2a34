//! URL validation and canonicalization.
//!
//! Platform links frequently carry a playlist or radio reference next to the
//! video id (`watch?v=ID&list=RDID&start_radio=1`). Handing such a URL to
//! the extractor downloads the whole playlist, so the normalizer rewrites it
//! to the single-video form `scheme://host/watch?v=ID`.
//!
//! No network access is performed.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::download::DownloadError;

/// Hosts accepted by [`UrlNormalizer::default`].
pub const DEFAULT_ALLOWED_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "youtu.be",
    "www.youtu.be",
    "music.youtube.com",
    "m.youtube.com",
];

/// List ids with this prefix are auto-generated radio/mix playlists.
const AUTO_RADIO_PREFIX: &str = "RD";

/// Kind of playlist reference found in a URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaylistKind {
    /// Auto-generated radio/mix (`list=RD...`).
    AutoRadio,
    /// A user-curated playlist.
    User,
}

impl PlaylistKind {
    fn from_list_id(list_id: &str) -> Self {
        if list_id.starts_with(AUTO_RADIO_PREFIX) {
            Self::AutoRadio
        } else {
            Self::User
        }
    }
}

impl fmt::Display for PlaylistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AutoRadio => f.write_str("auto-generated radio playlist"),
            Self::User => f.write_str("user playlist"),
        }
    }
}

/// Result of [`UrlNormalizer::normalize`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedUrl {
    /// URL to hand to the extractor.
    pub url: String,
    /// Whether the input was rewritten.
    pub rewritten: bool,
    /// Playlist reference that was stripped, if any.
    pub playlist: Option<PlaylistKind>,
}

impl NormalizedUrl {
    /// Human-readable note for the log, `None` when nothing was rewritten.
    #[must_use]
    pub fn note(&self) -> Option<String> {
        let kind = self.playlist?;
        Some(format!(
            "Detected {kind}; downloading the single video {}",
            self.url
        ))
    }
}

/// Breakdown of a URL for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlAnalysis {
    pub scheme: String,
    pub host: String,
    pub path: String,
    /// Query parameters in order of appearance.
    pub query: Vec<(String, String)>,
    pub video_id: Option<String>,
    pub playlist_id: Option<String>,
    pub playlist: Option<PlaylistKind>,
    /// `start_radio` present in the query.
    pub start_radio: bool,
    /// URL that [`UrlNormalizer::normalize`] would produce.
    pub clean_url: String,
}

/// Validates URLs against a host allow-list and strips playlist references.
#[derive(Clone, Debug)]
pub struct UrlNormalizer {
    allowed_hosts: Vec<String>,
}

impl Default for UrlNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_HOSTS.iter().copied())
    }
}

impl UrlNormalizer {
    /// Create a normalizer accepting the given hosts (case-insensitive).
    pub fn new<I, S>(allowed_hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_hosts: allowed_hosts
                .into_iter()
                .map(|h| h.as_ref().trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    /// Hosts accepted by this normalizer.
    pub fn allowed_hosts(&self) -> &[String] {
        &self.allowed_hosts
    }

    fn parse(&self, raw: &str) -> Result<Url, DownloadError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DownloadError::invalid_url(raw, "URL is empty"));
        }

        let url = Url::parse(trimmed)
            .map_err(|e| DownloadError::invalid_url(trimmed, e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(DownloadError::invalid_url(
                trimmed,
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        let host = url
            .host_str()
            .ok_or_else(|| DownloadError::invalid_url(trimmed, "URL has no host"))?
            .to_ascii_lowercase();

        if !self.allowed_hosts.iter().any(|h| *h == host) {
            return Err(DownloadError::invalid_url(
                trimmed,
                format!("host '{host}' is not a supported video platform"),
            ));
        }

        Ok(url)
    }

    /// Validate `raw` and rewrite playlist links to the single-video form.
    pub fn normalize(&self, raw: &str) -> Result<NormalizedUrl, DownloadError> {
        let url = self.parse(raw)?;
        let video_id = first_param(&url, "v");
        let list_id = first_param(&url, "list");

        match (video_id, list_id) {
            (Some(video_id), Some(list_id)) => Ok(NormalizedUrl {
                url: single_video_url(&url, &video_id)?,
                rewritten: true,
                playlist: Some(PlaylistKind::from_list_id(&list_id)),
            }),
            _ => Ok(NormalizedUrl {
                url: url.to_string(),
                rewritten: false,
                playlist: None,
            }),
        }
    }

    /// Break `raw` down into its parts.
    pub fn analyze(&self, raw: &str) -> Result<UrlAnalysis, DownloadError> {
        let url = self.parse(raw)?;
        let normalized = self.normalize(raw)?;

        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        let video_id = first_param(&url, "v").or_else(|| short_link_id(&url, &host));
        let playlist_id = first_param(&url, "list");

        Ok(UrlAnalysis {
            scheme: url.scheme().to_string(),
            path: url.path().to_string(),
            start_radio: query.iter().any(|(k, _)| k == "start_radio"),
            playlist: playlist_id.as_deref().map(PlaylistKind::from_list_id),
            query,
            video_id,
            playlist_id,
            clean_url: normalized.url,
            host,
        })
    }
}

fn first_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// `youtu.be/<id>` carries the id in the path.
fn short_link_id(url: &Url, host: &str) -> Option<String> {
    if !host.ends_with("youtu.be") {
        return None;
    }
    url.path_segments()?
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn single_video_url(url: &Url, video_id: &str) -> Result<String, DownloadError> {
    let host = url.host_str().unwrap_or_default();
    let base = match url.port() {
        Some(port) => format!("{}://{host}:{port}/watch", url.scheme()),
        None => format!("{}://{host}/watch", url.scheme()),
    };
    let mut clean =
        Url::parse(&base).map_err(|e| DownloadError::invalid_url(url.as_str(), e.to_string()))?;
    clean.query_pairs_mut().append_pair("v", video_id);
    Ok(clean.to_string())
}
