//! # Plugset Core Settings
//!
//! Per-plugin settings: a schema shipped with the plugin, user overrides kept
//! in its profile directory, and typed access to the merged values.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`value`]**: setting kinds, typed values and the [`SettingType`] trait
//!   behind the typed accessors.
//! - **[`document`]**: [`SettingsDocument`], the ordered key → cell mapping
//!   built from a schema tree and merged with user values.
//! - **[`store`]**: [`SettingsStore`], one lazily loaded document per instance
//!   id with latched load failures, plus save and change notification.
//! - **[`notifier`]**: the listener seams fired after a successful save.
//! - **[`manager`]**: [`SettingsManager`], the kernel component handing out one
//!   locked store per plugin.
//! - **[`error`]**: the [`SettingsError`](error::SettingsError) taxonomy.
pub mod document;
pub mod error;
pub mod manager;
pub mod notifier;
pub mod store;
pub mod value;

pub use document::{DocumentPhase, SettingsDocument};
pub use error::SettingsError;
pub use manager::{SettingsManager, SharedSettingsStore};
pub use notifier::{ChangeNotifier, InstanceSettingsListener, PendingChange, ScriptEngineObserver};
pub use store::{LoadState, SettingsStore};
pub use value::{SettingCell, SettingKind, SettingType, SettingValue};

/// Identifies one configured set of settings of a plugin
pub type InstanceId = u32;

/// The plugin's own settings, as opposed to those of an additional instance
pub const OWN_SETTINGS_ID: InstanceId = 0;

// Test module declaration
#[cfg(test)]
mod tests;
