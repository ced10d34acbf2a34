//! Typed encoding descriptors.

use serde::{Deserialize, Serialize};

/// Size of a format's file, as reported by the extractor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "bytes", rename_all = "snake_case")]
pub enum FileSize {
    Exact(u64),
    Approximate(u64),
}

impl FileSize {
    /// Size in bytes, regardless of precision.
    #[must_use]
    pub const fn bytes(self) -> u64 {
        match self {
            Self::Exact(b) | Self::Approximate(b) => b,
        }
    }

    /// Human-readable size in MiB, prefixed with `~` when approximate.
    #[must_use]
    pub fn display(self) -> String {
        #[allow(clippy::cast_precision_loss)]
        let mib = self.bytes() as f64 / (1024.0 * 1024.0);
        match self {
            Self::Exact(_) => format!("{mib:.1}MB"),
            Self::Approximate(_) => format!("~{mib:.1}MB"),
        }
    }
}

/// One selectable encoding offered for a video.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    pub format_id: String,
    pub extension: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
    /// Average audio bitrate in kbit/s.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_audio_bitrate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<FileSize>,
    /// Extractor's free-form label (e.g. `1080p`, `medium`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A codec field counts as present when set to anything other than `none`.
fn codec_present(codec: Option<&str>) -> bool {
    codec.is_some_and(|c| !c.is_empty() && !c.eq_ignore_ascii_case("none"))
}

impl FormatDescriptor {
    pub fn has_video(&self) -> bool {
        codec_present(self.video_codec.as_deref())
    }

    pub fn has_audio(&self) -> bool {
        codec_present(self.audio_codec.as_deref())
    }

    /// Video codec present and audio codec absent or `none`.
    pub fn is_video_only(&self) -> bool {
        self.has_video() && !self.has_audio()
    }

    /// Audio codec present and video codec absent or `none`.
    pub fn is_audio_only(&self) -> bool {
        self.has_audio() && !self.has_video()
    }

    /// Known size in bytes, exact or approximate.
    pub fn size_bytes(&self) -> Option<u64> {
        self.file_size.map(FileSize::bytes)
    }

    /// Resolution label such as `1080p`, or `audio only`.
    pub fn resolution_label(&self) -> String {
        match (self.height, self.has_video()) {
            (Some(h), _) => format!("{h}p"),
            (None, false) if self.has_audio() => "audio only".to_string(),
            _ => "?".to_string(),
        }
    }
}
