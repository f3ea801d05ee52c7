use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use crate::storage::error::{StorageResult, StorageSystemError};
use crate::storage::provider::StorageProvider;

/// Local filesystem storage provider
#[derive(Clone)]
pub struct LocalStorageProvider {
    base_path: PathBuf,
}

impl LocalStorageProvider {
    /// Create a new local storage provider with the given base path.
    ///
    /// Relative paths are resolved against `base_path`; absolute paths are used as-is.
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Provider rooted at the current working directory
    pub fn current_dir() -> Self {
        Self::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn resolve_path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.base_path.join(path)
    }
}

impl StorageProvider for LocalStorageProvider {
    fn name(&self) -> &str {
        "local"
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve_path(path).exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        self.resolve_path(path).is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.resolve_path(path).is_dir()
    }

    fn create_dir(&self, path: &Path) -> StorageResult<()> {
        let full_path = self.resolve_path(path);
        match fs::create_dir(&full_path) {
            Ok(()) => Ok(()),
            // Creating a directory that is already there is not a failure
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && full_path.is_dir() => Ok(()),
            Err(e) => Err(StorageSystemError::io(e, "create_dir", full_path)),
        }
    }

    fn create_dir_all(&self, path: &Path) -> StorageResult<()> {
        let full_path = self.resolve_path(path);
        fs::create_dir_all(&full_path).map_err(|e| StorageSystemError::io(e, "create_dir_all", full_path))
    }

    fn read_to_string(&self, path: &Path) -> StorageResult<String> {
        let full_path = self.resolve_path(path);
        if !full_path.exists() {
            return Err(StorageSystemError::FileNotFound(full_path));
        }
        fs::read_to_string(&full_path).map_err(|e| StorageSystemError::io(e, "read_to_string", full_path))
    }

    fn write_string(&self, path: &Path, contents: &str) -> StorageResult<()> {
        let full_path = self.resolve_path(path);

        let parent = match full_path.parent() {
            Some(parent) => parent.to_path_buf(),
            None => {
                return Err(StorageSystemError::OperationFailed {
                    operation: "write_string".to_string(),
                    path: Some(full_path.clone()),
                    message: "Cannot write to path without parent directory".to_string(),
                });
            }
        };
        // Write next to the target, then atomically replace it. The parent must exist.
        let mut temp_file = NamedTempFile::new_in(&parent)
            .map_err(|e| StorageSystemError::io(e, "create_temp_file", parent.clone()))?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| StorageSystemError::io(e, "write_to_temp_file", temp_file.path().to_path_buf()))?;

        temp_file
            .persist(&full_path)
            .map_err(|e| StorageSystemError::io(e.error, "persist_temp_file", full_path.clone()))?;

        Ok(())
    }
}

impl fmt::Debug for LocalStorageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalStorageProvider")
            .field("base_path", &self.base_path)
            .finish()
    }
}
