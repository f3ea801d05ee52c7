//! # Plugset Core Plugin System
//!
//! The plugin side of the settings engine: what a plugin must tell the
//! engine about itself and how it is told about changes.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`traits`]**: the [`Plugin`] trait (identity, install and profile
//!   directories, default overrides, change and lifecycle hooks) and
//!   [`PluginInfo`], a plain implementation of it.
//! - **[`registry`]**: [`PluginRegistry`], which also relays saved-settings
//!   notifications to the affected plugin.
//! - **[`lifecycle`]**: install and uninstall hook forwarding.
//! - **[`error`]**: [`PluginSystemError`](error::PluginSystemError).
pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod traits;

pub use registry::PluginRegistry;
pub use traits::{Plugin, PluginInfo};

// Test module declaration
#[cfg(test)]
mod tests;
