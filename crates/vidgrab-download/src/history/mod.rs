//! Bounded JSON history store.
//!
//! The whole list is rewritten on every append. Writes go to a temporary
//! file in the same directory which is then renamed over the target, so a
//! crash mid-write leaves the previous file intact.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use vidgrab_core::domain::HistoryEntry;
use vidgrab_core::download::{DownloadError, DownloadResult};
use vidgrab_core::ports::HistoryStorePort;

#[derive(Debug, Error)]
enum HistoryIoError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<HistoryIoError> for DownloadError {
    fn from(err: HistoryIoError) -> Self {
        Self::history_persist_failed(err.to_string())
    }
}

/// History persisted as a single JSON array, oldest first.
#[derive(Debug)]
pub struct JsonHistoryStore {
    path: PathBuf,
    max_entries: usize,
    entries: Mutex<Vec<HistoryEntry>>,
}

impl JsonHistoryStore {
    /// Open the store, loading existing entries eagerly.
    ///
    /// A missing or corrupt file yields an empty history.
    pub fn open(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        let path = path.into();
        let max_entries = max_entries.max(1);

        let mut entries = match read_entries(&path) {
            Ok(entries) => entries,
            Err(HistoryIoError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable history file");
                Vec::new()
            }
        };
        truncate_oldest(&mut entries, max_entries);

        tracing::debug!(path = %path.display(), count = entries.len(), "Loaded download history");

        Self {
            path,
            max_entries,
            entries: Mutex::new(entries),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, Vec<HistoryEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HistoryStorePort for JsonHistoryStore {
    fn append(&self, entry: HistoryEntry) -> DownloadResult<()> {
        let mut entries = self.entries();
        entries.push(entry);
        truncate_oldest(&mut entries, self.max_entries);

        write_atomic(&self.path, &entries).map_err(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist history");
            DownloadError::from(e)
        })
    }

    fn load(&self) -> Vec<HistoryEntry> {
        self.entries().clone()
    }

    fn max_entries(&self) -> usize {
        self.max_entries
    }
}

fn truncate_oldest(entries: &mut Vec<HistoryEntry>, max: usize) {
    if entries.len() > max {
        let excess = entries.len() - max;
        entries.drain(..excess);
    }
}

fn read_entries(path: &Path) -> Result<Vec<HistoryEntry>, HistoryIoError> {
    let contents = fs::read_to_string(path).map_err(|source| HistoryIoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&contents).map_err(|source| HistoryIoError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_atomic(path: &Path, entries: &[HistoryEntry]) -> Result<(), HistoryIoError> {
    let json = serde_json::to_vec_pretty(entries)?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let write_err = |source| HistoryIoError::Write {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(dir).map_err(write_err)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(&json).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
