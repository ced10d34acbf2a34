//! Video metadata and the extractor JSON boundary.
//!
//! The extractor emits loosely-typed JSON. [`RawVideoInfo`] and
//! [`RawFormat`] mirror that shape with every field optional; the `From`
//! conversions turn them into the typed forms used everywhere else.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::format::{FileSize, FormatDescriptor};

/// Metadata for one video, as reported by `probe` or `fetch`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
    /// Container extension of the downloaded file.
    pub extension: String,
    /// Final file path, when the extractor reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filepath: Option<PathBuf>,
    pub formats: Vec<FormatDescriptor>,
}

impl VideoInfo {
    /// Path of the downloaded file.
    ///
    /// Uses the extractor-reported path when present, otherwise the output
    /// template `{save_path}/{title}.{ext}`.
    #[must_use]
    pub fn output_path(&self, save_path: &Path) -> PathBuf {
        if let Some(path) = &self.filepath {
            return path.clone();
        }
        let title = if self.title.is_empty() {
            "video"
        } else {
            &self.title
        };
        let ext = if self.extension.is_empty() {
            "mp4"
        } else {
            &self.extension
        };
        save_path.join(format!("{title}.{ext}"))
    }

    /// Duration as `MM:SS` or `HH:MM:SS`, `unknown` when missing.
    #[must_use]
    pub fn duration_display(&self) -> String {
        let Some(total) = self.duration_seconds.filter(|d| *d > 0) else {
            return "unknown".to_string();
        };
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;
        if hours > 0 {
            format!("{hours:02}:{minutes:02}:{seconds:02}")
        } else {
            format!("{minutes:02}:{seconds:02}")
        }
    }

    /// View count with thousands separators, `unknown` when missing.
    #[must_use]
    pub fn views_display(&self) -> String {
        let Some(views) = self.view_count else {
            return "unknown".to_string();
        };
        let digits = views.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out
    }
}

/// Format entry exactly as the extractor emits it.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawFormat {
    #[serde(default)]
    pub format_id: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub fps: Option<f64>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub abr: Option<f64>,
    #[serde(default)]
    pub filesize: Option<f64>,
    #[serde(default)]
    pub filesize_approx: Option<f64>,
    #[serde(default)]
    pub format_note: Option<String>,
}

/// Video JSON exactly as the extractor emits it (`--dump-json`).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawVideoInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub filepath: Option<String>,
    #[serde(default, rename = "_filename")]
    pub legacy_filename: Option<String>,
    #[serde(default)]
    pub formats: Vec<RawFormat>,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn non_negative_u64(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0).then(|| value.round() as u64)
}

impl From<RawFormat> for FormatDescriptor {
    fn from(raw: RawFormat) -> Self {
        let file_size = raw
            .filesize
            .and_then(non_negative_u64)
            .map(FileSize::Exact)
            .or_else(|| {
                raw.filesize_approx
                    .and_then(non_negative_u64)
                    .map(FileSize::Approximate)
            });
        Self {
            format_id: raw.format_id.unwrap_or_default(),
            extension: raw.ext.unwrap_or_default(),
            height: raw
                .height
                .and_then(non_negative_u64)
                .and_then(|h| u32::try_from(h).ok()),
            fps: raw.fps.filter(|f| f.is_finite()),
            video_codec: raw.vcodec,
            audio_codec: raw.acodec,
            average_audio_bitrate: raw.abr.filter(|a| a.is_finite()),
            file_size,
            note: raw.format_note,
        }
    }
}

impl From<RawVideoInfo> for VideoInfo {
    fn from(raw: RawVideoInfo) -> Self {
        Self {
            id: raw.id.unwrap_or_default(),
            title: raw.title.unwrap_or_default(),
            duration_seconds: raw.duration.and_then(non_negative_u64),
            view_count: raw.view_count,
            uploader: raw.uploader,
            extension: raw.ext.unwrap_or_default(),
            filepath: raw.filepath.or(raw.legacy_filename).map(PathBuf::from),
            formats: raw.formats.into_iter().map(FormatDescriptor::from).collect(),
        }
    }
}

impl RawVideoInfo {
    /// Parse one JSON document from the extractor.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
