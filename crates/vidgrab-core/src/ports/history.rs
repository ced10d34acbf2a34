//! History store port.

use crate::domain::HistoryEntry;
use crate::download::DownloadResult;

/// Bounded, persisted log of completed downloads.
///
/// Calls are synchronous and may touch the filesystem; async callers should
/// run them on a blocking thread.
pub trait HistoryStorePort: Send + Sync {
    /// Append an entry, evicting the oldest beyond [`max_entries`](Self::max_entries).
    ///
    /// On a persistence failure the in-memory list still holds the entry and
    /// the error is `HistoryPersistFailed`.
    fn append(&self, entry: HistoryEntry) -> DownloadResult<()>;

    /// All entries, oldest first.
    fn load(&self) -> Vec<HistoryEntry>;

    /// The newest `limit` entries, newest first.
    fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        let mut entries = self.load();
        entries.reverse();
        entries.truncate(limit);
        entries
    }

    /// Configured bound.
    fn max_entries(&self) -> usize;
}
