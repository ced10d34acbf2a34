//! yt-dlp adapter against stand-in shell scripts.
//!
//! Every scenario lives in one test so all scripts are written before any
//! child process is spawned from this binary.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use vidgrab_core::download::{
    DownloadError, ExtractorOptions, FailureCategory, FetchProgress, FetchStatus, ProgressControl,
};
use vidgrab_core::ports::ExtractorPort;
use vidgrab_download::YtDlpExtractor;

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[tokio::test]
async fn fake_extractor_scripts() {
    let dir = tempfile::tempdir().unwrap();
    let ok = script(
        dir.path(),
        "ok.sh",
        r#"echo '[vidgrab] downloading|  50.0%|1.00MiB/s|00:01'
echo 'some chatter' >&2
echo '[vidgrab] finished|100%|NA|NA'
echo '{"id":"abc","title":"Fake video","ext":"mp4"}'"#,
    );
    let forbidden = script(
        dir.path(),
        "forbidden.sh",
        r"echo 'WARNING: retrying' >&2
echo 'ERROR: unable to download video data: HTTP Error 403: Forbidden' >&2
exit 1",
    );
    let silent = script(dir.path(), "silent.sh", "exit 0");
    let probe = script(
        dir.path(),
        "probe.sh",
        r#"echo '{"id":"abc","title":"Probed","duration":61,"formats":[{"format_id":"18","ext":"mp4","vcodec":"avc1","acodec":"mp4a"}]}'"#,
    );
    let endless = script(
        dir.path(),
        "endless.sh",
        r"while true; do
  echo '[vidgrab] downloading|  10.0%|1.00MiB/s|00:10'
  sleep 0.05
done",
    );
    let options = ExtractorOptions::default();

    // Successful fetch: progress reaches the callback, info comes back.
    let seen = Mutex::new(Vec::new());
    let record = |p: FetchProgress| {
        seen.lock().unwrap().push(p);
        ProgressControl::Continue
    };
    let info = YtDlpExtractor::with_binary(&ok)
        .fetch("https://youtu.be/abc", dir.path(), &options, &record)
        .await
        .unwrap();
    assert_eq!(info.title, "Fake video");
    assert_eq!(info.output_path(dir.path()), dir.path().join("Fake video.mp4"));
    let seen = seen.into_inner().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].percent(), Some(50.0));
    assert_eq!(seen[1].status, FetchStatus::Finished);
    assert!(seen[1].speed_text.is_empty());

    // Failing fetch: the last ERROR line wins and is classified.
    let err = YtDlpExtractor::with_binary(&forbidden)
        .fetch("https://youtu.be/abc", dir.path(), &options, &|_: FetchProgress| {
            ProgressControl::Continue
        })
        .await
        .unwrap_err();
    let (message, category) = match err {
        DownloadError::ExtractionFailed { message, category } => (message, category),
        other => panic!("expected extraction failure, got {other:?}"),
    };
    assert!(message.starts_with("unable to download video data"));
    assert_eq!(category, FailureCategory::Forbidden);

    // Clean exit without an info line is still a failure.
    let err = YtDlpExtractor::with_binary(&silent)
        .fetch("https://youtu.be/abc", dir.path(), &options, &|_: FetchProgress| {
            ProgressControl::Continue
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DownloadError::ExtractionFailed { .. }));

    // Probe parses the JSON document on stdout.
    let info = YtDlpExtractor::with_binary(&probe)
        .probe("https://youtu.be/abc", &options)
        .await
        .unwrap();
    assert_eq!(info.title, "Probed");
    assert_eq!(info.duration_display(), "01:01");
    assert_eq!(info.formats.len(), 1);
    assert_eq!(info.formats[0].format_id, "18");

    // Abort from the callback stops the child and reports cancellation.
    let err = YtDlpExtractor::with_binary(&endless)
        .fetch("https://youtu.be/abc", dir.path(), &options, &|_: FetchProgress| {
            ProgressControl::Abort
        })
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
}
