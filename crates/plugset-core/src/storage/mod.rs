//! # Plugset Core Storage
//!
//! Filesystem access and document handling for the settings engine.
//!
//! - [`provider`] / [`local`]: the [`StorageProvider`] seam and its local
//!   filesystem implementation (atomic writes through a temporary file).
//! - [`tree`]: the element tree every settings document is parsed into.
//! - [`xml`] / [`format`]: codecs, selected by file extension.
//! - [`gateway`]: [`DocumentGateway`], the load/save boundary used by the
//!   settings store.
pub mod error;
pub mod format;
pub mod gateway;
pub mod local;
pub mod provider;
pub mod tree;
pub mod xml;

/// Re-export key types
pub use error::{StorageResult, StorageSystemError};
pub use format::{DocumentFormat, ParseFailure};
pub use gateway::DocumentGateway;
pub use local::LocalStorageProvider;
pub use provider::StorageProvider;
pub use tree::{Element, SettingsTree};
