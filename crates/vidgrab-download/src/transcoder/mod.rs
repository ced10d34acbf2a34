//! ffmpeg subprocess adapter.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use vidgrab_core::download::{DownloadError, DownloadResult};
use vidgrab_core::ports::TranscoderPort;

const TOOL_NAME: &str = "ffmpeg";

/// Characters of stderr kept in a `TranscodeFailed` error.
const STDERR_TAIL_CHARS: usize = 2000;

/// Encoder settings passed to ffmpeg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscodeProfile {
    pub video_codec: String,
    pub preset: String,
    pub crf: u8,
    pub audio_codec: String,
}

impl Default for TranscodeProfile {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            preset: "medium".to_string(),
            crf: 23,
            audio_codec: "aac".to_string(),
        }
    }
}

/// Build the ffmpeg argument list. The output is overwritten.
pub fn transcode_args(input: &Path, output: &Path, profile: &TranscodeProfile) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-i".to_string(),
        input.display().to_string(),
        "-c:v".to_string(),
        profile.video_codec.clone(),
        "-preset".to_string(),
        profile.preset.clone(),
        "-crf".to_string(),
        profile.crf.to_string(),
        "-c:a".to_string(),
        profile.audio_codec.clone(),
        "-y".to_string(),
        output.display().to_string(),
    ]
}

/// Transcoder backed by the `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary: Option<PathBuf>,
    profile: TranscodeProfile,
}

impl FfmpegTranscoder {
    /// Resolve `configured` on PATH.
    ///
    /// A missing binary is not an error here; `transcode` reports
    /// `MissingDependency` when it is actually needed.
    pub fn locate(configured: &str) -> Self {
        let binary = match which::which(configured) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::debug!(configured, error = %e, "Transcoder binary not found");
                None
            }
        };
        Self {
            binary,
            profile: TranscodeProfile::default(),
        }
    }

    #[must_use]
    pub fn with_profile(mut self, profile: TranscodeProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn profile(&self) -> &TranscodeProfile {
        &self.profile
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim_end();
    let count = text.chars().count();
    if count <= STDERR_TAIL_CHARS {
        return text.to_string();
    }
    text.chars().skip(count - STDERR_TAIL_CHARS).collect()
}

#[async_trait]
impl TranscoderPort for FfmpegTranscoder {
    fn is_available(&self) -> bool {
        self.binary.is_some()
    }

    async fn transcode(&self, input: &Path, output: &Path) -> DownloadResult<()> {
        let Some(binary) = &self.binary else {
            return Err(DownloadError::missing_dependency(TOOL_NAME));
        };
        if input == output {
            return Err(DownloadError::other(
                "transcode output must differ from its input",
            ));
        }

        let args = transcode_args(input, output, &self.profile);
        tracing::info!(input = %input.display(), output = %output.display(), "Transcoding");

        let result = Command::new(binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DownloadError::missing_dependency(TOOL_NAME)
                } else {
                    DownloadError::from_io_error(&e)
                }
            })?;

        if result.status.success() {
            tracing::debug!(output = %output.display(), "Transcode finished");
            Ok(())
        } else {
            Err(DownloadError::transcode_failed(
                result.status.code(),
                stderr_tail(&result.stderr),
            ))
        }
    }
}
