use std::path::Path;

use serde::{Deserialize, Serialize};

/// `strftime` format of [`HistoryEntry::timestamp`].
pub const HISTORY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Record of one confirmed successful download.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Local time, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    pub url: String,
    pub title: String,
    pub format_id: String,
    pub save_path: String,
}

impl HistoryEntry {
    /// Entry stamped with the current local time.
    pub fn now(
        url: impl Into<String>,
        title: impl Into<String>,
        format_id: impl Into<String>,
        save_path: &Path,
    ) -> Self {
        Self {
            timestamp: chrono::Local::now()
                .format(HISTORY_TIMESTAMP_FORMAT)
                .to_string(),
            url: url.into(),
            title: title.into(),
            format_id: format_id.into(),
            save_path: save_path.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_field_names() {
        let entry = HistoryEntry::now("u", "t", "137+140", Path::new("/tmp"));
        let value = serde_json::to_value(&entry).unwrap();
        for key in ["timestamp", "url", "title", "format_id", "save_path"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(entry.timestamp.len(), "2024-01-01 00:00:00".len());
    }
}
