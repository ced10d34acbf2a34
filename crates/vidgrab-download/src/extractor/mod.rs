//! yt-dlp subprocess adapter.
//!
//! # Protocol
//!
//! - `probe` runs `yt-dlp -J` and parses the single JSON document on stdout
//! - `fetch` downloads with a custom progress template and `--dump-json
//!   --no-simulate`, so the final info JSON arrives as one stdout line after
//!   the download; stdout and stderr are read concurrently
//! - Non-progress stderr lines are retained as diagnostics for error
//!   classification

mod args;
mod progress;

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{ChildStderr, ChildStdout, Command};

use vidgrab_core::domain::{RawVideoInfo, VideoInfo};
use vidgrab_core::download::{
    DownloadError, DownloadResult, ExtractorOptions, FailureCategory, ProgressControl,
};
use vidgrab_core::ports::{ExtractorPort, ProgressCallback};

use crate::process::{DEFAULT_GRACE, shutdown_child};

pub use args::{PROGRESS_TEMPLATE, fetch_args, probe_args};
pub use progress::parse_progress_line;

const TOOL_NAME: &str = "yt-dlp";

/// Number of diagnostic lines kept for error reporting.
const DIAGNOSTIC_TAIL: usize = 40;

/// Extractor backed by the `yt-dlp` binary.
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    binary: PathBuf,
}

impl YtDlpExtractor {
    /// Resolve `configured` (a name on PATH or a path) to an executable.
    pub fn locate(configured: &str) -> DownloadResult<Self> {
        which::which(configured)
            .map(|binary| Self { binary })
            .map_err(|e| {
                tracing::debug!(configured, error = %e, "Extractor binary not found");
                DownloadError::missing_dependency(TOOL_NAME)
            })
    }

    /// Use an explicit binary path without checking it.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

fn spawn_error(err: &std::io::Error) -> DownloadError {
    if err.kind() == std::io::ErrorKind::NotFound {
        DownloadError::missing_dependency(TOOL_NAME)
    } else {
        DownloadError::from_io_error(err)
    }
}

/// Build an `ExtractionFailed` from retained diagnostics.
fn failure_from_diagnostics<'a>(
    lines: impl Iterator<Item = &'a str> + Clone,
    exit_code: Option<i32>,
) -> DownloadError {
    let joined: String = lines.clone().collect::<Vec<_>>().join("\n");
    let message = lines
        .clone()
        .filter(|l| l.contains("ERROR"))
        .last()
        .or_else(|| lines.filter(|l| !l.trim().is_empty()).last())
        .map_or_else(
            || format!("{TOOL_NAME} exited with code {exit_code:?}"),
            |l| l.trim().trim_start_matches("ERROR:").trim().to_string(),
        );
    DownloadError::ExtractionFailed {
        message,
        category: FailureCategory::classify(&joined),
    }
}

fn parse_info(json: &str) -> DownloadResult<VideoInfo> {
    RawVideoInfo::from_json(json)
        .map(VideoInfo::from)
        .map_err(|e| DownloadError::ExtractionFailed {
            message: format!("unreadable {TOOL_NAME} output: {e}"),
            category: FailureCategory::Other,
        })
}

enum StreamLine {
    Stdout(std::io::Result<Option<String>>),
    Stderr(std::io::Result<Option<String>>),
}

/// Collects everything `fetch` learns from the child's output.
#[derive(Default)]
struct FetchOutput {
    info: Option<VideoInfo>,
    diagnostics: VecDeque<String>,
}

impl FetchOutput {
    fn keep_diagnostic(&mut self, line: String) {
        if self.diagnostics.len() == DIAGNOSTIC_TAIL {
            self.diagnostics.pop_front();
        }
        self.diagnostics.push_back(line);
    }

    /// Handle one output line. Returns `Abort` when the callback asked to stop.
    fn handle_line(&mut self, line: String, on_progress: ProgressCallback<'_>) -> ProgressControl {
        if let Some(progress) = parse_progress_line(&line) {
            return on_progress(progress);
        }
        let trimmed = line.trim_start();
        if trimmed.starts_with('{') {
            match parse_info(trimmed) {
                Ok(info) => self.info = Some(info),
                Err(e) => tracing::warn!(error = %e, "Ignoring malformed info line"),
            }
            return ProgressControl::Continue;
        }
        if !trimmed.is_empty() {
            tracing::debug!(line = %trimmed, "extractor");
            self.keep_diagnostic(line);
        }
        ProgressControl::Continue
    }
}

async fn next_line(
    stdout: &mut Lines<BufReader<ChildStdout>>,
    stdout_open: bool,
    stderr: &mut Lines<BufReader<ChildStderr>>,
    stderr_open: bool,
) -> Option<StreamLine> {
    tokio::select! {
        line = stdout.next_line(), if stdout_open => Some(StreamLine::Stdout(line)),
        line = stderr.next_line(), if stderr_open => Some(StreamLine::Stderr(line)),
        else => None,
    }
}

#[async_trait]
impl ExtractorPort for YtDlpExtractor {
    async fn probe(&self, url: &str, options: &ExtractorOptions) -> DownloadResult<VideoInfo> {
        let args = probe_args(url, options);
        tracing::debug!(binary = %self.binary.display(), ?args, "Probing");

        let output = self
            .command(&args)
            .output()
            .await
            .map_err(|e| spawn_error(&e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failure_from_diagnostics(
                stderr.lines(),
                output.status.code(),
            ));
        }

        parse_info(&String::from_utf8_lossy(&output.stdout))
    }

    async fn fetch(
        &self,
        url: &str,
        save_dir: &Path,
        options: &ExtractorOptions,
        on_progress: ProgressCallback<'_>,
    ) -> DownloadResult<VideoInfo> {
        let args = fetch_args(url, save_dir, options);
        tracing::debug!(binary = %self.binary.display(), ?args, "Fetching");

        let mut child = self.command(&args).spawn().map_err(|e| spawn_error(&e))?;
        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(DownloadError::other("extractor output pipes unavailable"));
        };
        let mut stdout = BufReader::new(stdout).lines();
        let mut stderr = BufReader::new(stderr).lines();
        let (mut stdout_open, mut stderr_open) = (true, true);
        let mut output = FetchOutput::default();

        while let Some(event) = next_line(&mut stdout, stdout_open, &mut stderr, stderr_open).await
        {
            let line = match event {
                StreamLine::Stdout(Ok(Some(line))) | StreamLine::Stderr(Ok(Some(line))) => line,
                StreamLine::Stdout(result) => {
                    if let Err(e) = result {
                        tracing::warn!(error = %e, "Extractor stdout read failed");
                    }
                    stdout_open = false;
                    continue;
                }
                StreamLine::Stderr(result) => {
                    if let Err(e) = result {
                        tracing::warn!(error = %e, "Extractor stderr read failed");
                    }
                    stderr_open = false;
                    continue;
                }
            };

            if output.handle_line(line, on_progress) == ProgressControl::Abort {
                tracing::info!(url, "Stopping extractor at progress checkpoint");
                if let Err(e) = shutdown_child(&mut child, DEFAULT_GRACE).await {
                    tracing::warn!(error = %e, "Failed to stop extractor cleanly");
                }
                return Err(DownloadError::Cancelled);
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| DownloadError::from_io_error(&e))?;

        if !status.success() {
            return Err(failure_from_diagnostics(
                output.diagnostics.iter().map(String::as_str),
                status.code(),
            ));
        }

        output.info.ok_or_else(|| DownloadError::ExtractionFailed {
            message: format!("{TOOL_NAME} finished without reporting video metadata"),
            category: FailureCategory::Other,
        })
    }
}
