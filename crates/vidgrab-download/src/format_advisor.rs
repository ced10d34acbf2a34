//! Best-format recommendation.
//!
//! Picks the best video-only and the best audio-only stream and combines
//! them into a `video+audio` selector. Only descriptors with a known size
//! are eligible; extractors list placeholder streams without one.

use std::cmp::Ordering;

use vidgrab_core::domain::FormatDescriptor;

/// Where a chosen selector came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionSource {
    /// The user asked for it.
    Requested,
    /// Produced by [`recommend`].
    Recommended,
    /// The configured default selector.
    Fallback,
}

/// Result of [`select_format`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatSelection {
    pub selector: String,
    pub source: SelectionSource,
}

fn cmp_f64(a: Option<f64>, b: Option<f64>) -> Ordering {
    a.unwrap_or(0.0).total_cmp(&b.unwrap_or(0.0))
}

fn video_rank(a: &FormatDescriptor, b: &FormatDescriptor) -> Ordering {
    a.height
        .unwrap_or(0)
        .cmp(&b.height.unwrap_or(0))
        .then_with(|| cmp_f64(a.fps, b.fps))
        .then_with(|| a.size_bytes().cmp(&b.size_bytes()))
        .then_with(|| a.format_id.cmp(&b.format_id))
}

fn audio_rank(a: &FormatDescriptor, b: &FormatDescriptor) -> Ordering {
    cmp_f64(a.average_audio_bitrate, b.average_audio_bitrate)
        .then_with(|| a.size_bytes().cmp(&b.size_bytes()))
        .then_with(|| a.format_id.cmp(&b.format_id))
}

/// Recommend a combined `"<video>+<audio>"` selector.
///
/// Video: greatest height, then fps. Audio: greatest average bitrate.
/// Further ties break on size, then format id, so the result never depends
/// on input order. Returns `None` if either side has no eligible descriptor.
pub fn recommend(formats: &[FormatDescriptor]) -> Option<String> {
    let best_video = formats
        .iter()
        .filter(|f| f.is_video_only() && f.height.is_some() && f.size_bytes().is_some())
        .max_by(|a, b| video_rank(a, b))?;

    let best_audio = formats
        .iter()
        .filter(|f| {
            f.is_audio_only() && f.average_audio_bitrate.is_some() && f.size_bytes().is_some()
        })
        .max_by(|a, b| audio_rank(a, b))?;

    Some(format!("{}+{}", best_video.format_id, best_audio.format_id))
}

/// Choose the selector for a download.
///
/// A non-blank `requested` selector wins; otherwise the recommendation;
/// otherwise `fallback`.
pub fn select_format(
    requested: Option<&str>,
    formats: &[FormatDescriptor],
    fallback: &str,
) -> FormatSelection {
    if let Some(requested) = requested.map(str::trim).filter(|r| !r.is_empty()) {
        return FormatSelection {
            selector: requested.to_string(),
            source: SelectionSource::Requested,
        };
    }
    match recommend(formats) {
        Some(selector) => FormatSelection {
            selector,
            source: SelectionSource::Recommended,
        },
        None => FormatSelection {
            selector: fallback.to_string(),
            source: SelectionSource::Fallback,
        },
    }
}

/// Whether `selector` can only be satisfied by merging separate streams,
/// which requires the transcoder binary.
///
/// A selector with a single-file alternative (`bv*+ba/b`) does not.
pub fn requires_merge(selector: &str) -> bool {
    let mut alternatives = selector.split('/').map(str::trim).filter(|a| !a.is_empty());
    alternatives.clone().next().is_some() && alternatives.all(|a| a.contains('+'))
}

/// Post-download audio conversion implied by a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioExtraction {
    /// Target codec passed to `--audio-format`.
    pub codec: &'static str,
    /// Target bitrate passed to `--audio-quality`.
    pub quality: &'static str,
}

const AUDIO_QUALITY: &str = "192K";

/// Audio-only selectors convert the download to an audio file.
///
/// `bestaudio` becomes mp3; any other selector starting with `audio` keeps
/// the best available codec.
pub fn audio_extraction(selector: &str) -> Option<AudioExtraction> {
    let selector = selector.trim();
    let codec = if selector == "bestaudio" {
        "mp3"
    } else if selector
        .get(..5)
        .is_some_and(|head| head.eq_ignore_ascii_case("audio"))
    {
        "best"
    } else {
        return None;
    };
    Some(AudioExtraction {
        codec,
        quality: AUDIO_QUALITY,
    })
}

/// Whether downloading `selector` needs the transcoder binary at all,
/// for merging streams or for audio extraction.
pub fn requires_transcoder(selector: &str) -> bool {
    requires_merge(selector) || audio_extraction(selector).is_some()
}
