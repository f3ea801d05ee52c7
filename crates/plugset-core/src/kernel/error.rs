//! # Plugset Core Kernel Errors
//!
//! Defines the aggregate error type of the settings engine.
//!
//! Every subsystem owns a typed error enum ([`StorageSystemError`],
//! [`SettingsError`], [`PluginSystemError`]); [`Error`] wraps them so that
//! kernel-level code (components, configuration, the CLI) can propagate any
//! of them with `?`.
use std::path::PathBuf;
use std::result::Result as StdResult;

use crate::plugin_system::error::PluginSystemError;
use crate::settings::error::SettingsError;
use crate::storage::error::StorageSystemError;
use thiserror::Error as ThisError;

/// Aggregate error type for the settings engine
#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Specific, typed storage system error
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// Specific, typed settings error
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Engine configuration could not be loaded or is invalid
    #[error("Configuration error in '{}': {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// Error occurring during a component lifecycle phase.
    #[error("Component '{component}' failed during {phase:?}: {message}")]
    ComponentLifecycle {
        component: String,
        phase: LifecyclePhase,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Represents a specific phase in a component's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum LifecyclePhase {
    #[error("Initialize")]
    Initialize,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// Build a configuration error
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Build a lifecycle error for a named component
    pub fn lifecycle(
        component: impl Into<String>,
        phase: LifecyclePhase,
        message: impl Into<String>,
        source: Option<Error>,
    ) -> Self {
        Error::ComponentLifecycle {
            component: component.into(),
            phase,
            message: message.into(),
            source: source.map(Box::new),
        }
    }
}
