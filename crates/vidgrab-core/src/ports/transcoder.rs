//! Transcoder port.

use std::path::Path;

use async_trait::async_trait;

use crate::download::DownloadResult;

/// Converts a downloaded media file into another container/codec.
#[async_trait]
pub trait TranscoderPort: Send + Sync {
    /// Whether the transcoder binary can be run.
    fn is_available(&self) -> bool;

    /// Transcode `input` into `output`, overwriting `output`.
    ///
    /// `input` is never modified or deleted.
    async fn transcode(&self, input: &Path, output: &Path) -> DownloadResult<()>;
}
