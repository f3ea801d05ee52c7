use std::fmt::Debug;
use std::path::Path;
use crate::storage::error::StorageResult;

/// Filesystem primitives the settings engine reads and writes through
pub trait StorageProvider: Send + Sync + Debug {
    /// Get the name of this provider
    fn name(&self) -> &str;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Check if a path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Create a single directory; the parent must already exist
    fn create_dir(&self, path: &Path) -> StorageResult<()>;

    /// Create a directory and all its parent directories
    fn create_dir_all(&self, path: &Path) -> StorageResult<()>;

    /// Read a file to a string
    fn read_to_string(&self, path: &Path) -> StorageResult<String>;

    /// Write a string to a file, replacing any previous contents.
    /// The parent directory must already exist.
    fn write_string(&self, path: &Path, contents: &str) -> StorageResult<()>;
}
