//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the vidgrab downloader.
#[derive(Parser, Debug)]
#[command(name = "vidgrab")]
#[command(about = "Queue and download online videos with yt-dlp")]
#[command(version)]
pub struct Cli {
    /// Proxy URL used for every network operation (http, https or socks)
    #[arg(long, global = true, env = "VIDGRAB_PROXY")]
    pub proxy: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::DownloadArgs;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "vidgrab",
            "--verbose",
            "--proxy",
            "socks5://127.0.0.1:1080",
            "paths",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.proxy.as_deref(), Some("socks5://127.0.0.1:1080"));
        assert!(matches!(cli.command, Some(Commands::Paths)));
    }

    #[test]
    fn test_download_args() {
        let cli = Cli::parse_from([
            "vidgrab",
            "download",
            "https://youtu.be/a",
            "https://youtu.be/b",
            "-o",
            "/tmp/videos",
            "-f",
            "137+140",
            "--subs",
            "--fragments",
            "4",
            "--transcode",
            "mp4",
            "--workers",
            "2",
        ]);
        let Some(Commands::Download(DownloadArgs {
            urls,
            output,
            format,
            subs,
            fragments,
            transcode,
            workers,
            batch_file,
        })) = cli.command
        else {
            panic!("expected download command");
        };
        assert_eq!(urls, vec!["https://youtu.be/a", "https://youtu.be/b"]);
        assert_eq!(output.as_deref(), Some(std::path::Path::new("/tmp/videos")));
        assert_eq!(format.as_deref(), Some("137+140"));
        assert!(subs);
        assert_eq!(fragments, 4);
        assert_eq!(transcode.as_deref(), Some("mp4"));
        assert_eq!(workers, Some(2));
        assert!(batch_file.is_none());
    }

    #[test]
    fn test_history_defaults() {
        let cli = Cli::parse_from(["vidgrab", "history"]);
        assert!(matches!(
            cli.command,
            Some(Commands::History {
                limit: 50,
                json: false
            })
        ));
    }

    #[test]
    fn test_zero_fragments_rejected() {
        let result = Cli::try_parse_from(["vidgrab", "download", "u", "--fragments", "0"]);
        assert!(result.is_err());
    }
}
