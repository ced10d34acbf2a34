//! Main commands enum and primary subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Default number of history rows shown.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Available vidgrab commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download one or more videos
    Download(DownloadArgs),

    /// Show metadata for a video without downloading it
    Info {
        /// Video URL
        url: String,
    },

    /// List the available formats and the recommended selector
    Formats {
        /// Video URL
        url: String,
    },

    /// Break a URL down into its parts and show how it will be normalized
    Analyze {
        /// Video URL
        url: String,
    },

    /// Show recent downloads, newest first
    History {
        /// Number of entries to show
        #[arg(short, long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show resolved paths for all vidgrab directories
    Paths,
}

/// Arguments of `vidgrab download`.
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Video URLs to download
    pub urls: Vec<String>,

    /// Read additional URLs from a file, one per line (`#` starts a comment)
    #[arg(long, value_name = "FILE")]
    pub batch_file: Option<PathBuf>,

    /// Directory to save into
    #[arg(short, long, value_name = "DIR", env = "VIDGRAB_DOWNLOAD_DIR")]
    pub output: Option<PathBuf>,

    /// Format selector passed to the extractor (e.g. "137+140", "bv*+ba/b")
    #[arg(short, long, value_name = "SELECTOR")]
    pub format: Option<String>,

    /// Also download subtitles
    #[arg(long)]
    pub subs: bool,

    /// Concurrent fragment downloads per video
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=32))]
    pub fragments: u32,

    /// Transcode each finished download to this container (e.g. "mp4")
    #[arg(long, value_name = "FORMAT")]
    pub transcode: Option<String>,

    /// Number of parallel downloads
    #[arg(long, env = "VIDGRAB_MAX_WORKERS", value_parser = clap::value_parser!(u32).range(1..=16))]
    pub workers: Option<u32>,
}
