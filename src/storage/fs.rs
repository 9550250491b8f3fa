use crate::model::StorageError;
use crate::storage::Storage;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Filesystem-backed storage rooted at a directory.
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a storage path onto the root, refusing anything that could escape it.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl Storage for FsStorage {
    fn list_files(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let dir = self.resolve(prefix)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let prefix = prefix.trim_end_matches('/');
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if prefix.is_empty() {
                files.push(name);
            } else {
                files.push(format!("{prefix}/{name}"));
            }
        }
        files.sort();
        debug!("Listed {} files under {}", files.len(), dir.display());
        Ok(files)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        match fs::read(self.resolve(path)?) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(path.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a temp file next to the target and renames it into place, so
    /// readers see either the old contents or the complete new ones.
    fn write(&self, path: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let target = self.resolve(path)?;
        let parent = target.parent().unwrap_or(&self.root);
        fs::create_dir_all(parent)?;

        let mut staged = NamedTempFile::new_in(parent)?;
        staged.write_all(bytes)?;
        staged.as_file().sync_all()?;
        staged.persist(&target).map_err(|e| StorageError::Io(e.error))?;
        debug!("Wrote {} bytes to {}", bytes.len(), target.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_then_read_round_trips_and_creates_folders() {
        let dir = TempDir::new().unwrap();
        let storage = FsStorage::new(dir.path());
        storage.write("exports/export_1.xml", b"<x/>").unwrap();
        assert_eq!(storage.read("exports/export_1.xml").unwrap(), b"<x/>");
    }

    #[test]
    fn list_files_is_sorted_and_skips_directories() {
        let dir = TempDir::new().unwrap();
        let storage = FsStorage::new(dir.path());
        storage.write("exports/b.xml", b"").unwrap();
        storage.write("exports/a.xml", b"").unwrap();
        storage.write("exports/nested/c.xml", b"").unwrap();
        assert_eq!(
            storage.list_files("exports").unwrap(),
            vec!["exports/a.xml", "exports/b.xml"]
        );
    }

    #[test]
    fn listing_a_missing_folder_is_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FsStorage::new(dir.path());
        assert!(storage.list_files("exports").unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let storage = FsStorage::new(dir.path());
        let err = storage.read("exports/none.xml").unwrap_err();
        assert!(matches!(err, StorageError::NotFound(p) if p == "exports/none.xml"));
    }

    #[test]
    fn write_replaces_existing_contents() {
        let dir = TempDir::new().unwrap();
        let storage = FsStorage::new(dir.path());
        storage.write("exports/export_1.xml", b"<old/>").unwrap();
        storage.write("exports/export_1.xml", b"<new/>").unwrap();
        assert_eq!(storage.read("exports/export_1.xml").unwrap(), b"<new/>");
        assert_eq!(storage.list_files("exports").unwrap(), vec!["exports/export_1.xml"]);
    }

    #[test]
    fn failed_write_leaves_no_partial_file() {
        let dir = TempDir::new().unwrap();
        let storage = FsStorage::new(dir.path());
        // A directory squatting on the target name makes the final rename fail.
        fs::create_dir_all(dir.path().join("exports/export_200.xml")).unwrap();

        let err = storage.write("exports/export_200.xml", b"<feed/>").unwrap_err();
        assert!(matches!(err, StorageError::Io(_)), "{err:?}");
        assert!(storage.list_files("exports").unwrap().is_empty());
    }

    #[test]
    fn paths_cannot_escape_the_root() {
        let dir = TempDir::new().unwrap();
        let storage = FsStorage::new(dir.path());
        for path in ["../secret", "/etc/passwd", "exports/../../x"] {
            let err = storage.write(path, b"x").unwrap_err();
            assert!(matches!(err, StorageError::InvalidPath(_)), "{path}");
        }
    }
}
