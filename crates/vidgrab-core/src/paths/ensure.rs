//! Directory creation and verification.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use super::error::PathError;

/// How to handle a missing directory in [`ensure_directory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectoryCreationStrategy {
    /// Create missing directories (and parents).
    #[default]
    AutoCreate,
    /// Return an error if the directory is missing.
    Disallow,
}

/// Ensure `path` exists as a writable directory.
pub fn ensure_directory(path: &Path, strategy: DirectoryCreationStrategy) -> Result<(), PathError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(PathError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
    } else {
        match strategy {
            DirectoryCreationStrategy::AutoCreate => {
                fs::create_dir_all(path).map_err(|source| PathError::CreateFailed {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
            DirectoryCreationStrategy::Disallow => {
                return Err(PathError::DirectoryNotFound {
                    path: path.to_path_buf(),
                });
            }
        }
    }

    verify_writable(path)
}

/// Verify a directory is writable by creating and removing a probe file.
pub fn verify_writable(path: &Path) -> Result<(), PathError> {
    let probe = path.join(".vidgrab_write_test");
    let not_writable = |source: std::io::Error| PathError::NotWritable {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&probe)
        .map_err(not_writable)?;
    file.write_all(b"test").map_err(not_writable)?;
    drop(file);
    let _ = fs::remove_file(&probe);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_create() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a").join("b");
        ensure_directory(&target, DirectoryCreationStrategy::AutoCreate).unwrap();
        assert!(target.is_dir());
        assert!(!target.join(".vidgrab_write_test").exists());
    }

    #[test]
    fn test_disallow_missing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing");
        assert!(matches!(
            ensure_directory(&target, DirectoryCreationStrategy::Disallow),
            Err(PathError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn test_file_is_not_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(
            ensure_directory(&file, DirectoryCreationStrategy::AutoCreate),
            Err(PathError::NotADirectory { .. })
        ));
    }
}
