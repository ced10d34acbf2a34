//! Command-line construction for the extractor.

use std::path::Path;

use vidgrab_core::download::ExtractorOptions;

use crate::format_advisor::audio_extraction;

/// Prefix of progress lines produced by [`PROGRESS_TEMPLATE`].
pub const PROGRESS_PREFIX: &str = "[vidgrab] ";

/// Progress template: `status|percent|speed|eta`.
pub const PROGRESS_TEMPLATE: &str = "[vidgrab] %(progress.status)s|%(progress._percent_str)s|%(progress._speed_str)s|%(progress._eta_str)s";

/// Output template relative to the save directory.
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

fn network_args(options: &ExtractorOptions, args: &mut Vec<String>) {
    args.push("--socket-timeout".into());
    args.push(options.timeout_secs.to_string());
    args.push("--retries".into());
    args.push(options.retries.to_string());
    if let Some(proxy) = options.proxy.as_deref().filter(|p| !p.is_empty()) {
        args.push("--proxy".into());
        args.push(proxy.to_string());
    }
}

/// Arguments for a metadata-only probe.
pub fn probe_args(url: &str, options: &ExtractorOptions) -> Vec<String> {
    let mut args = vec!["-J".to_string(), "--no-playlist".to_string()];
    network_args(options, &mut args);
    args.push("--".into());
    args.push(url.to_string());
    args
}

/// Arguments for a download.
///
/// `--dump-json --no-simulate` prints the final info JSON on stdout after
/// the download completes.
pub fn fetch_args(url: &str, save_dir: &Path, options: &ExtractorOptions) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        options.format.clone(),
        "-o".to_string(),
        save_dir.join(OUTPUT_TEMPLATE).display().to_string(),
        "--no-playlist".to_string(),
        "--newline".to_string(),
        "--progress".to_string(),
        "--progress-template".to_string(),
        PROGRESS_TEMPLATE.to_string(),
        "--dump-json".to_string(),
        "--no-simulate".to_string(),
    ];
    network_args(options, &mut args);
    args.push("--fragment-retries".into());
    args.push(options.retries.to_string());
    args.push("--concurrent-fragments".into());
    args.push(options.concurrent_fragments.max(1).to_string());

    if options.subtitles.enabled {
        args.push("--write-subs".into());
        args.push("--write-auto-subs".into());
        if !options.subtitles.languages.is_empty() {
            args.push("--sub-langs".into());
            args.push(options.subtitles.languages.join(","));
        }
    }

    if let Some(audio) = audio_extraction(&options.format) {
        args.push("-x".into());
        args.push("--audio-format".into());
        args.push(audio.codec.into());
        args.push("--audio-quality".into());
        args.push(audio.quality.into());
    }

    args.push("--".into());
    args.push(url.to_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn probe_args_are_read_only() {
        let args = probe_args("https://youtu.be/x", &ExtractorOptions::default());
        assert_eq!(args[0], "-J");
        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(!args.contains(&"--no-simulate".to_string()));
        assert_eq!(value_after(&args, "--socket-timeout"), Some("60"));
        assert_eq!(args.last().map(String::as_str), Some("https://youtu.be/x"));
        assert!(value_after(&args, "--proxy").is_none());
    }

    #[test]
    fn fetch_args_carry_options() {
        let mut options = ExtractorOptions::default()
            .with_proxy(Some("http://127.0.0.1:7897".to_string()));
        options.format = "137+140".to_string();
        options.concurrent_fragments = 8;
        options.subtitles.enabled = true;

        let args = fetch_args("https://youtu.be/x", Path::new("/downloads"), &options);
        assert_eq!(value_after(&args, "-f"), Some("137+140"));
        assert_eq!(value_after(&args, "-o"), Some("/downloads/%(title)s.%(ext)s"));
        assert_eq!(value_after(&args, "--proxy"), Some("http://127.0.0.1:7897"));
        assert_eq!(value_after(&args, "--retries"), Some("15"));
        assert_eq!(value_after(&args, "--fragment-retries"), Some("15"));
        assert_eq!(value_after(&args, "--concurrent-fragments"), Some("8"));
        assert_eq!(value_after(&args, "--sub-langs"), Some("en,zh-Hans,zh-Hant"));
        assert_eq!(value_after(&args, "--progress-template"), Some(PROGRESS_TEMPLATE));
        assert!(args.contains(&"--write-auto-subs".to_string()));
        assert!(args.contains(&"--dump-json".to_string()));
    }

    #[test]
    fn fetch_args_without_subtitles() {
        let args = fetch_args("u", Path::new("/d"), &ExtractorOptions::default());
        assert!(!args.contains(&"--write-subs".to_string()));
        assert!(value_after(&args, "--sub-langs").is_none());
    }

    #[test]
    fn fetch_args_extract_audio() {
        let audio = |format: &str| ExtractorOptions {
            format: format.to_string(),
            ..ExtractorOptions::default()
        };
        let args = fetch_args("u", Path::new("/d"), &audio("bestaudio"));
        assert!(args.contains(&"-x".to_string()));
        assert_eq!(value_after(&args, "--audio-format"), Some("mp3"));
        assert_eq!(value_after(&args, "--audio-quality"), Some("192K"));

        let args = fetch_args("u", Path::new("/d"), &audio("audio_only"));
        assert_eq!(value_after(&args, "--audio-format"), Some("best"));

        let args = fetch_args("u", Path::new("/d"), &ExtractorOptions::default());
        assert!(!args.contains(&"-x".to_string()));
        assert!(value_after(&args, "--audio-format").is_none());
    }

    #[test]
    fn url_follows_separator() {
        let args = fetch_args("-rf", Path::new("/d"), &ExtractorOptions::default());
        let n = args.len();
        assert_eq!(args[n - 2], "--");
        assert_eq!(args[n - 1], "-rf");
    }
}
