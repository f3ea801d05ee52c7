//! Engine configuration.
//!
//! [`EngineConfig`] says where plugins are installed, where their profile
//! data lives and how settings files are named. It can be read from JSON,
//! YAML or TOML (chosen by extension); every field has a default.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::kernel::constants::{
    DEFAULT_INSTALL_ROOT, DEFAULT_PROFILE_ROOT, INSTANCE_SCHEMA_FILE, INSTANCE_SETTINGS_PREFIX,
    RESOURCES_DIR, SCHEMA_FILE, USER_SETTINGS_FILE,
};
use crate::kernel::error::{Error, Result};
use crate::settings::{InstanceId, OWN_SETTINGS_ID};
use crate::storage::format::{self, DocumentFormat};
use crate::storage::provider::StorageProvider;

/// File naming inside plugin install and profile directories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsLayout {
    /// User-values file of the plugin's own settings, relative to the profile directory
    pub user_settings_file: String,
    /// Stem of per-instance user-values files
    pub instance_settings_prefix: String,
    /// Resources directory, relative to the install directory
    pub resources_dir: String,
    /// Schema file inside the resources directory
    pub schema_file: String,
    /// Optional schema for additional instances inside the resources directory
    pub instance_schema_file: String,
}

impl Default for SettingsLayout {
    fn default() -> Self {
        Self {
            user_settings_file: USER_SETTINGS_FILE.to_string(),
            instance_settings_prefix: INSTANCE_SETTINGS_PREFIX.to_string(),
            resources_dir: RESOURCES_DIR.to_string(),
            schema_file: SCHEMA_FILE.to_string(),
            instance_schema_file: INSTANCE_SCHEMA_FILE.to_string(),
        }
    }
}

impl SettingsLayout {
    /// `<install dir>/resources/settings.xml`
    pub fn schema_path(&self, install_path: &Path) -> PathBuf {
        install_path.join(&self.resources_dir).join(&self.schema_file)
    }

    /// `<install dir>/resources/instance-settings.xml`
    pub fn instance_schema_path(&self, install_path: &Path) -> PathBuf {
        install_path.join(&self.resources_dir).join(&self.instance_schema_file)
    }

    /// User-values file for an instance: `settings.xml` for the plugin's own
    /// settings, `instance-settings-<id>.<ext>` otherwise.
    pub fn user_settings_path(&self, profile_path: &Path, instance_id: InstanceId) -> PathBuf {
        if instance_id == OWN_SETTINGS_ID {
            return profile_path.join(&self.user_settings_file);
        }
        let extension = Path::new(&self.user_settings_file)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or(DocumentFormat::Xml.extension());
        profile_path.join(format!(
            "{}-{}.{}",
            self.instance_settings_prefix, instance_id, extension
        ))
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding one subdirectory per installed plugin
    pub install_root: PathBuf,
    /// Directory holding one profile subdirectory per plugin
    pub profile_root: PathBuf,
    pub layout: SettingsLayout,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            install_root: PathBuf::from(DEFAULT_INSTALL_ROOT),
            profile_root: PathBuf::from(DEFAULT_PROFILE_ROOT),
            layout: SettingsLayout::default(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration file; its format is picked from the extension
    pub fn load(provider: &dyn StorageProvider, path: &Path) -> Result<Self> {
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| Error::config(path, "unknown configuration format"))?;
        let content = provider.read_to_string(path)?;
        format::from_str(&content, format).map_err(|failure| Error::config(path, failure.to_string()))
    }

    /// Write the configuration, creating parent directories as needed
    pub fn save(&self, provider: &dyn StorageProvider, path: &Path) -> Result<()> {
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| Error::config(path, "unknown configuration format"))?;
        let content = format::to_string(self, format)?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            provider.create_dir_all(parent)?;
        }
        provider.write_string(path, &content)?;
        Ok(())
    }

    /// Install directory of a plugin
    pub fn plugin_install_path(&self, plugin_id: &str) -> PathBuf {
        self.install_root.join(plugin_id)
    }

    /// Profile directory of a plugin
    pub fn plugin_profile_path(&self, plugin_id: &str) -> PathBuf {
        self.profile_root.join(plugin_id)
    }
}
