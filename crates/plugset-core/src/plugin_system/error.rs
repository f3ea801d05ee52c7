//! # Plugset Core Plugin System Errors
//!
//! Defines [`PluginSystemError`], raised when plugins are registered or looked up.
#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Plugin not found: '{plugin_id}'")]
    NotFound { plugin_id: String },

    #[error("Plugin registration error for '{plugin_id}': {message}")]
    RegistrationError { plugin_id: String, message: String },

    #[error("Plugin '{plugin_id}' is already registered")]
    AlreadyRegistered { plugin_id: String },

    #[error("Internal plugin system error: {0}")]
    InternalError(String),
}
