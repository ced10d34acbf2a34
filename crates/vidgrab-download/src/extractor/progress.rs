//! Parsing of templated progress lines.

use vidgrab_core::download::{FetchProgress, FetchStatus};

use super::args::PROGRESS_PREFIX;

/// Parse one line produced by the progress template.
///
/// Returns `None` for lines that are not progress lines or carry an unknown
/// status.
pub fn parse_progress_line(line: &str) -> Option<FetchProgress> {
    let body = line.trim_end().strip_prefix(PROGRESS_PREFIX)?;
    let mut fields = body.splitn(4, '|').map(clean_field);

    let status = match fields.next()?.as_str() {
        "downloading" => FetchStatus::Downloading,
        "finished" => FetchStatus::Finished,
        _ => return None,
    };

    Some(FetchProgress {
        status,
        percent_text: fields.next().unwrap_or_default(),
        speed_text: fields.next().unwrap_or_default(),
        eta_text: fields.next().unwrap_or_default(),
    })
}

/// Trim padding and strip ANSI color sequences the extractor may add.
fn clean_field(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' && chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    let trimmed = out.trim();
    if trimmed == "NA" || trimmed == "N/A" {
        String::new()
    } else {
        trimmed.to_string()
    }
}
