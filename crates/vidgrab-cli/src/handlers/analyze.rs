//! Analyze command handler.
//!
//! Shows how a URL is parsed and what will actually be downloaded. No
//! network access.

use vidgrab_core::utils::url_normalizer::UrlAnalysis;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::format_optional;

/// `key = value` lines describing `analysis`.
pub fn describe(analysis: &UrlAnalysis) -> Vec<String> {
    let mut lines = vec![
        format!("scheme = {}", analysis.scheme),
        format!("host = {}", analysis.host),
        format!("path = {}", analysis.path),
    ];
    for (key, value) in &analysis.query {
        lines.push(format!("query.{key} = {value}"));
    }
    lines.push(format!(
        "video_id = {}",
        format_optional(analysis.video_id.as_ref(), "-")
    ));
    lines.push(format!(
        "playlist_id = {}",
        format_optional(analysis.playlist_id.as_ref(), "-")
    ));
    lines.push(format!(
        "playlist = {}",
        format_optional(analysis.playlist.as_ref(), "-")
    ));
    lines.push(format!("start_radio = {}", analysis.start_radio));
    lines.push(format!("download_url = {}", analysis.clean_url));
    lines
}

/// Execute the analyze command.
pub fn execute(ctx: &CliContext, url: &str) -> Result<(), CliError> {
    let analysis = ctx.normalizer().analyze(url)?;
    for line in describe(&analysis) {
        println!("{line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use vidgrab_core::utils::url_normalizer::UrlNormalizer;

    use super::*;

    #[test]
    fn test_describe_radio_link() {
        let analysis = UrlNormalizer::default()
            .analyze("https://www.youtube.com/watch?v=abc123&list=RDabc123&start_radio=1")
            .unwrap();
        let lines = describe(&analysis);
        assert!(lines.contains(&"video_id = abc123".to_string()));
        assert!(lines.contains(&"playlist_id = RDabc123".to_string()));
        assert!(lines.contains(&"playlist = auto-generated radio playlist".to_string()));
        assert!(lines.contains(&"start_radio = true".to_string()));
        assert!(lines.contains(&"query.list = RDabc123".to_string()));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("download_url = https://www.youtube.com/watch?v=abc123")
        );
    }

    #[test]
    fn test_describe_short_link() {
        let analysis = UrlNormalizer::default()
            .analyze("https://youtu.be/xyz789")
            .unwrap();
        let lines = describe(&analysis);
        assert!(lines.contains(&"video_id = xyz789".to_string()));
        assert!(lines.contains(&"playlist = -".to_string()));
    }
}
