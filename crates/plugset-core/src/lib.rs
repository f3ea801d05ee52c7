// Core modules
pub mod kernel;
pub mod plugin_system;
pub mod settings;
pub mod storage;

// Re-export key public types/traits for easier use by the binary and embedders
pub use kernel::error::{Error, Result};
pub use kernel::config::{EngineConfig, SettingsLayout};
pub use plugin_system::{Plugin, PluginInfo, PluginRegistry};
pub use settings::{
    InstanceId, OWN_SETTINGS_ID, SettingKind, SettingType, SettingValue, SettingsDocument,
    SettingsManager, SettingsStore,
};
pub use storage::{LocalStorageProvider, SettingsTree, StorageProvider};
