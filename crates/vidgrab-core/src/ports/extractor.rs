//! Extractor/downloader port.

use async_trait::async_trait;

use crate::domain::VideoInfo;
use crate::download::{DownloadResult, ExtractorOptions, FetchProgress, ProgressControl};

/// Callback invoked for every progress tick during `fetch`.
///
/// Returning [`ProgressControl::Abort`] asks the extractor to stop; the
/// fetch then resolves to [`DownloadError::Cancelled`](crate::DownloadError).
pub type ProgressCallback<'a> = &'a (dyn Fn(FetchProgress) -> ProgressControl + Send + Sync);

/// Resolves video URLs into metadata and downloads media.
#[async_trait]
pub trait ExtractorPort: Send + Sync {
    /// Read-only metadata lookup. Writes no files.
    async fn probe(&self, url: &str, options: &ExtractorOptions) -> DownloadResult<VideoInfo>;

    /// Download `url` into `save_dir` using the output template
    /// `{save_dir}/{title}.{ext}`.
    async fn fetch(
        &self,
        url: &str,
        save_dir: &std::path::Path,
        options: &ExtractorOptions,
        on_progress: ProgressCallback<'_>,
    ) -> DownloadResult<VideoInfo>;
}
