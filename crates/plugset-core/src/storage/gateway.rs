//! Persistence gateway: reads and writes settings documents through a
//! [`StorageProvider`], picking the codec from the file extension.
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use crate::settings::error::SettingsError;
use crate::storage::format::DocumentFormat;
use crate::storage::provider::StorageProvider;
use crate::storage::tree::SettingsTree;

/// Boundary between the settings engine and the filesystem
#[derive(Clone)]
pub struct DocumentGateway {
    provider: Arc<dyn StorageProvider>,
}

impl DocumentGateway {
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self { provider }
    }

    /// Whether a document file is present at `path`
    pub fn file_exists(&self, path: &Path) -> bool {
        self.provider.is_file(path)
    }

    pub fn dir_exists(&self, path: &Path) -> bool {
        self.provider.is_dir(path)
    }

    /// Load and parse the document at `path`.
    ///
    /// A missing file yields [`SettingsError::DocumentNotFound`]; malformed
    /// content yields [`SettingsError::Parse`] with the location of the problem.
    pub fn load_document(&self, path: &Path) -> Result<SettingsTree, SettingsError> {
        let format = format_for(path)?;
        if !self.provider.is_file(path) {
            return Err(SettingsError::DocumentNotFound(path.to_path_buf()));
        }

        let content = self.provider.read_to_string(path).map_err(|e| {
            if e.is_not_found() {
                SettingsError::DocumentNotFound(path.to_path_buf())
            } else {
                SettingsError::Storage(e)
            }
        })?;

        format.parse_tree(&content).map_err(|failure| SettingsError::Parse {
            path: path.to_path_buf(),
            line: failure.line,
            column: failure.column,
            message: failure.message,
        })
    }

    /// Serialize `tree` and write it to `path`, replacing any previous file
    pub fn save_document(&self, tree: &SettingsTree, path: &Path) -> Result<(), SettingsError> {
        let format = format_for(path)?;
        let content = format.write_tree(tree)?;
        self.provider.write_string(path, &content)?;
        debug!("Wrote settings document {}", path.display());
        Ok(())
    }

    /// Create a single directory unless it is already there
    pub fn ensure_dir(&self, path: &Path) -> Result<(), SettingsError> {
        if self.provider.is_dir(path) {
            return Ok(());
        }
        self.provider.create_dir(path)?;
        Ok(())
    }
}

fn format_for(path: &Path) -> Result<DocumentFormat, SettingsError> {
    DocumentFormat::from_path(path).ok_or_else(|| SettingsError::UnsupportedFormat(PathBuf::from(path)))
}

impl fmt::Debug for DocumentGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentGateway")
            .field("provider", &self.provider.name())
            .finish()
    }
}
