//! Formats command handler.

use vidgrab_core::domain::FormatDescriptor;
use vidgrab_core::ports::TranscoderPort;
use vidgrab_download::format_advisor::{FormatSelection, SelectionSource, requires_merge};
use vidgrab_download::select_format;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::info::probe;
use crate::presentation::{format_optional, print_separator, truncate_string};

fn codec(codec: Option<&String>) -> String {
    match codec.map(String::as_str) {
        Some("none") | None => "-".to_string(),
        Some(c) => truncate_string(c, 12),
    }
}

/// One table row for `format`.
pub fn format_row(format: &FormatDescriptor) -> String {
    let size = format
        .file_size
        .map_or_else(|| "-".to_string(), |s| s.display());
    let fps = format.fps.map(|f| format!("{f:.0}"));
    let abr = format.average_audio_bitrate.map(|a| format!("{a:.0}k"));
    format!(
        "{:<10} {:<5} {:<10} {:>4} {:<12} {:<12} {:>6} {:>10}  {}",
        truncate_string(&format.format_id, 10),
        format.extension,
        format.resolution_label(),
        format_optional(fps.as_ref(), "-"),
        codec(format.video_codec.as_ref()),
        codec(format.audio_codec.as_ref()),
        format_optional(abr.as_ref(), "-"),
        size,
        format_optional(format.note.as_ref(), ""),
    )
}

/// Lines explaining the chosen selector.
pub fn describe_selection(selection: &FormatSelection, transcoder_available: bool) -> Vec<String> {
    let origin = match selection.source {
        SelectionSource::Requested => "requested",
        SelectionSource::Recommended => "best video + best audio",
        SelectionSource::Fallback => "default",
    };
    let mut lines = vec![format!("Recommended: {} ({origin})", selection.selector)];
    if requires_merge(&selection.selector) && !transcoder_available {
        lines.push("ffmpeg is required to merge these streams but was not found".to_string());
    }
    lines
}

/// Execute the formats command.
pub async fn execute(ctx: &CliContext, url: &str) -> Result<(), CliError> {
    let info = probe(ctx, url).await?;
    println!();
    println!("{}", info.title);
    println!(
        "{:<10} {:<5} {:<10} {:>4} {:<12} {:<12} {:>6} {:>10}  NOTE",
        "ID", "EXT", "RES", "FPS", "VCODEC", "ACODEC", "ABR", "SIZE"
    );
    print_separator(90);
    for format in &info.formats {
        println!("{}", format_row(format));
    }
    print_separator(90);

    let selection = select_format(
        None,
        &info.formats,
        &ctx.settings().effective_default_format(),
    );
    for line in describe_selection(&selection, ctx.transcoder().is_available()) {
        println!("{line}");
    }
    Ok(())
}
