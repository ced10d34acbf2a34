//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where adapters are wired together for the
//! CLI. All concrete implementations are instantiated here:
//! - Settings (via vidgrab-core)
//! - History store, extractor and transcoder adapters (via vidgrab-download)
//! - The download scheduler (via vidgrab-download)
//!
//! Command handlers receive the composed context and delegate work to it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use vidgrab_core::download::{ExtractorOptions, SubtitleOptions};
use vidgrab_core::paths::{default_download_dir, history_path, settings_path};
use vidgrab_core::ports::{DownloadSchedulerPort, SchedulerConfig};
use vidgrab_core::settings::{Settings, validate_settings};
use vidgrab_core::utils::url_normalizer::UrlNormalizer;
use vidgrab_download::{
    FfmpegTranscoder, JsonHistoryStore, ProgressReporter, SchedulerDeps, YtDlpExtractor,
    build_scheduler,
};

use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Effective settings (file values plus command-line overrides).
    pub settings: Settings,
    /// Location of the download history file.
    pub history_path: PathBuf,
}

impl CliConfig {
    /// Load settings from the data directory. A missing file yields defaults.
    pub fn load() -> Result<Self, CliError> {
        let settings_file = settings_path()?;
        let settings = Settings::load_from(&settings_file)?;
        tracing::debug!(path = %settings_file.display(), "Loaded settings");
        Ok(Self {
            settings,
            history_path: history_path()?,
        })
    }

    /// Build a config from explicit parts.
    pub fn new(settings: Settings, history_path: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            history_path: history_path.into(),
        }
    }

    /// Replace the configured proxy when `proxy` is given.
    #[must_use]
    pub fn with_proxy_override(mut self, proxy: Option<String>) -> Self {
        if proxy.is_some() {
            self.settings.proxy = proxy;
        }
        self
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    settings: Settings,
    history: Arc<JsonHistoryStore>,
    transcoder: Arc<FfmpegTranscoder>,
    normalizer: UrlNormalizer,
}

impl CliContext {
    /// Access the effective settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Access the history store.
    pub fn history(&self) -> &Arc<JsonHistoryStore> {
        &self.history
    }

    /// Access the transcoder adapter.
    pub fn transcoder(&self) -> &Arc<FfmpegTranscoder> {
        &self.transcoder
    }

    /// Access the URL normalizer.
    pub const fn normalizer(&self) -> &UrlNormalizer {
        &self.normalizer
    }

    /// Configured proxy, if any.
    pub fn proxy(&self) -> Option<&str> {
        self.settings
            .proxy
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Locate the extractor binary.
    ///
    /// Resolved on demand so commands that never run it work without it.
    pub fn extractor(&self) -> Result<Arc<YtDlpExtractor>, CliError> {
        let extractor = YtDlpExtractor::locate(self.settings.effective_extractor_path())?;
        tracing::debug!(binary = %extractor.binary().display(), "Using extractor");
        Ok(Arc::new(extractor))
    }

    /// Extractor options for metadata probes.
    pub fn probe_options(&self) -> ExtractorOptions {
        ExtractorOptions {
            timeout_secs: self.settings.effective_socket_timeout_secs(),
            retries: self.settings.effective_retries(),
            subtitles: SubtitleOptions {
                enabled: false,
                languages: self.settings.effective_subtitle_languages(),
            },
            ..ExtractorOptions::default()
        }
        .with_proxy(self.proxy().map(str::to_string))
    }

    /// Where downloads go: the flag, else the settings, else the platform
    /// download directory.
    pub fn download_dir(&self, flag: Option<&Path>) -> Result<PathBuf, CliError> {
        if let Some(dir) = flag {
            return Ok(dir.to_path_buf());
        }
        match self.settings.download_dir() {
            Some(dir) => Ok(dir),
            None => Ok(default_download_dir()?),
        }
    }

    /// Scheduler configuration, with an optional worker-count override.
    pub fn scheduler_config(&self, workers: Option<u32>) -> SchedulerConfig {
        let config = SchedulerConfig::from_settings(&self.settings);
        match workers {
            Some(n) => config.with_max_workers(n),
            None => config,
        }
    }

    /// Compose a scheduler publishing to `reporter`.
    pub fn build_scheduler(
        &self,
        reporter: ProgressReporter,
        workers: Option<u32>,
    ) -> Result<Arc<dyn DownloadSchedulerPort>, CliError> {
        let config = self.scheduler_config(workers);
        tracing::debug!(max_workers = config.max_workers, "Building scheduler");
        Ok(build_scheduler(SchedulerDeps {
            extractor: self.extractor()?,
            transcoder: self.transcoder.clone(),
            history: self.history.clone(),
            emitter: Arc::new(reporter),
            config,
        }))
    }
}

/// Bootstrap the CLI application.
///
/// Validates the settings, opens the history store and locates the
/// transcoder. The extractor is located lazily by [`CliContext::extractor`].
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let CliConfig {
        settings,
        history_path,
    } = config;
    validate_settings(&settings)?;

    let history = Arc::new(JsonHistoryStore::open(
        history_path,
        settings.effective_history_max_entries(),
    ));
    let transcoder = Arc::new(FfmpegTranscoder::locate(
        settings.effective_transcoder_path(),
    ));
    let normalizer = UrlNormalizer::new(settings.effective_allowed_hosts());

    Ok(CliContext {
        settings,
        history,
        transcoder,
        normalizer,
    })
}

#[cfg(test)]
mod tests {
    use vidgrab_core::ports::HistoryStorePort;

    use super::*;

    fn config(dir: &Path, settings: Settings) -> CliConfig {
        CliConfig::new(settings, dir.join("download_history.json"))
    }

    #[test]
    fn test_bootstrap_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = bootstrap(config(dir.path(), Settings::with_defaults())).unwrap();
        assert!(ctx.history().load().is_empty());
        assert_eq!(ctx.history().path(), dir.path().join("download_history.json"));
        assert!(ctx.proxy().is_none());
    }

    #[test]
    fn test_invalid_settings_are_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            max_concurrent_downloads: Some(0),
            ..Settings::with_defaults()
        };
        let err = bootstrap(config(dir.path(), settings)).err().unwrap();
        assert_eq!(err.exit_code(), 78);
    }

    #[test]
    fn test_proxy_override_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), Settings::with_defaults())
            .with_proxy_override(Some("ftp://nope".to_string()));
        assert!(bootstrap(cfg).is_err());

        let cfg = config(dir.path(), Settings::with_defaults())
            .with_proxy_override(Some("http://127.0.0.1:8080".to_string()));
        let ctx = bootstrap(cfg).unwrap();
        assert_eq!(ctx.proxy(), Some("http://127.0.0.1:8080"));
        assert_eq!(
            ctx.probe_options().proxy.as_deref(),
            Some("http://127.0.0.1:8080")
        );
    }

    #[test]
    fn test_missing_proxy_override_keeps_settings() {
        let settings = Settings {
            proxy: Some("socks5://127.0.0.1:1080".to_string()),
            ..Settings::with_defaults()
        };
        let cfg = CliConfig::new(settings, "h.json").with_proxy_override(None);
        assert_eq!(cfg.settings.proxy.as_deref(), Some("socks5://127.0.0.1:1080"));
    }

    #[test]
    fn test_download_dir_prefers_flag() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            default_download_path: Some("/srv/videos".to_string()),
            ..Settings::with_defaults()
        };
        let ctx = bootstrap(config(dir.path(), settings)).unwrap();
        assert_eq!(
            ctx.download_dir(Some(Path::new("/tmp/x"))).unwrap(),
            PathBuf::from("/tmp/x")
        );
        assert_eq!(ctx.download_dir(None).unwrap(), PathBuf::from("/srv/videos"));
    }

    #[test]
    fn test_worker_override() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = bootstrap(config(dir.path(), Settings::with_defaults())).unwrap();
        assert_eq!(ctx.scheduler_config(Some(7)).max_workers, 7);
        assert_eq!(
            ctx.scheduler_config(None).max_workers,
            ctx.settings().effective_max_concurrent_downloads()
        );
    }
}
