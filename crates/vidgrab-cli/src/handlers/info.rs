//! Info command handler.

use vidgrab_core::domain::VideoInfo;
use vidgrab_core::ports::ExtractorPort;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::format_optional;

/// Resolve `url` to its metadata without downloading.
pub async fn probe(ctx: &CliContext, url: &str) -> Result<VideoInfo, CliError> {
    let normalized = ctx.normalizer().normalize(url)?;
    if let Some(note) = normalized.note() {
        println!("{note}");
    }
    let extractor = ctx.extractor()?;
    println!("Fetching video information...");
    let info = extractor
        .probe(&normalized.url, &ctx.probe_options())
        .await
        .map_err(|e| {
            for hint in e.remediation_hints(ctx.proxy().is_some()) {
                eprintln!("  {hint}");
            }
            CliError::from(e)
        })?;
    Ok(info)
}

/// `label: value` lines describing `info`.
pub fn describe(info: &VideoInfo) -> Vec<String> {
    vec![
        format!("Title:    {}", info.title),
        format!("Duration: {}", info.duration_display()),
        format!("Views:    {}", info.views_display()),
        format!(
            "Uploader: {}",
            format_optional(info.uploader.as_ref(), "unknown")
        ),
        format!("ID:       {}", info.id),
        format!("Formats:  {}", info.formats.len()),
    ]
}

/// Execute the info command.
pub async fn execute(ctx: &CliContext, url: &str) -> Result<(), CliError> {
    let info = probe(ctx, url).await?;
    println!();
    for line in describe(&info) {
        println!("{line}");
    }
    Ok(())
}
