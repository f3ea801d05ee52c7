//! # Plugset Core Storage System Errors
//!
//! Defines error types specific to the storage layer.
//!
//! [`StorageSystemError`] covers file I/O, path problems and document
//! (de)serialization failures raised by [`StorageProvider`](super::StorageProvider)
//! implementations and the document codecs.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageSystemError {
    #[error("I/O error during operation '{operation}' on path '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found at path: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Serialization to '{format}' failed: {source}")]
    SerializationError {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Storage operation '{operation}' failed for path '{}': {message}", path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<unknown>".into()))]
    OperationFailed {
        operation: String,
        path: Option<PathBuf>,
        message: String,
    },
}

/// Shorthand for results of storage operations
pub type StorageResult<T> = Result<T, StorageSystemError>;

// Helper for creating Io errors, ensuring path is always included.
impl StorageSystemError {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        StorageSystemError::Io {
            source,
            operation: operation.into(),
            path,
        }
    }

    pub fn serialization(
        format: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        StorageSystemError::SerializationError {
            format: format.into(),
            source: Box::new(source),
        }
    }

    /// Whether the error means the target simply does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            StorageSystemError::FileNotFound(_) => true,
            StorageSystemError::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
