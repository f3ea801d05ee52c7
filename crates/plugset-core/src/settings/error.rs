//! # Plugset Core Settings Errors
//!
//! [`SettingsError`] is the failure taxonomy of the settings layer. Store
//! operations never surface it as control flow: they log it and report
//! failure through a boolean, an `Option` or an empty string. It travels as
//! a value only out of the persistence gateway, the document and
//! [`SettingsStore::save_settings`](super::SettingsStore::save_settings).
use std::path::PathBuf;
use thiserror::Error;

use crate::settings::value::SettingKind;
use crate::storage::error::StorageSystemError;

#[derive(Debug, Error)]
pub enum SettingsError {
    /// The schema or values file does not exist. Benign: a plugin may have no settings.
    #[error("Settings document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    #[error("Unable to parse '{}', line {line}, column {column}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Settings schema rejected: {0}")]
    SchemaInit(String),

    #[error("Failed to merge value for setting '{key}': {message}")]
    MergeFailed { key: String, message: String },

    #[error("Setting '{key}' is declared as {declared}, not {requested}")]
    TypeMismatch {
        key: String,
        declared: SettingKind,
        requested: SettingKind,
    },

    #[error("Setting not found: {0}")]
    KeyNotFound(String),

    #[error("'{text}' is not a valid {kind} value")]
    InvalidValue { kind: SettingKind, text: String },

    #[error("Settings document has not been initialized")]
    NotInitialized,

    #[error("Unsupported settings document format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error(transparent)]
    Storage(#[from] StorageSystemError),
}

impl SettingsError {
    /// Whether the failure only means "there is nothing on disk"
    pub fn is_not_found(&self) -> bool {
        match self {
            SettingsError::DocumentNotFound(_) => true,
            SettingsError::Storage(inner) => inner.is_not_found(),
            _ => false,
        }
    }
}
