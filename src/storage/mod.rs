// Storage module: path-addressed blob store and export file conventions.

pub mod exports;
pub mod fs;

use crate::model::StorageError;

pub use fs::FsStorage;

/// A blob store addressed by `/`-separated relative paths.
pub trait Storage {
    /// Files directly inside `prefix`, as full relative paths, sorted ascending.
    fn list_files(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError>;
    fn write(&self, path: &str, bytes: &[u8]) -> Result<(), StorageError>;
}
