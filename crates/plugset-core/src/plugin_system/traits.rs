use std::fmt;
use std::path::{Path, PathBuf};

use crate::kernel::config::EngineConfig;
use crate::settings::InstanceId;

/// Core trait every plugin with settings implements.
///
/// Only identity and the two directories are required. The remaining hooks
/// default to doing nothing.
pub trait Plugin: Send + Sync {
    /// Unique identifier, also the name of the install and profile subdirectories
    fn id(&self) -> &str;

    /// Human readable name
    fn name(&self) -> &str {
        self.id()
    }

    fn version(&self) -> &str;

    /// Directory the plugin is installed in; the schema lives below it
    fn install_path(&self) -> &Path;

    /// Writable directory for the plugin's user values
    fn profile_path(&self) -> &Path;

    /// Override the schema default of a setting.
    ///
    /// Returning `Some` replaces whatever default the schema declares.
    fn default_setting(&self, _key: &str) -> Option<String> {
        None
    }

    /// Called after settings of `instance_id` were saved
    fn on_settings_changed(&self, _instance_id: InstanceId) {}

    fn on_pre_install(&self) {}

    fn on_post_install(&self, _update: bool, _modal: bool) {}

    fn on_pre_uninstall(&self) {}

    fn on_post_uninstall(&self) {}
}

impl fmt::Debug for dyn Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("id", &self.id())
            .field("version", &self.version())
            .finish()
    }
}

/// Plain plugin description with no behavior of its own.
///
/// Used for plugins known only by their id and directories, such as the
/// ones the command line tool operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    id: String,
    version: String,
    install_path: PathBuf,
    profile_path: PathBuf,
}

impl PluginInfo {
    pub fn new(
        id: impl Into<String>,
        version: impl Into<String>,
        install_path: impl Into<PathBuf>,
        profile_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            install_path: install_path.into(),
            profile_path: profile_path.into(),
        }
    }

    /// Describe a plugin laid out under the configured roots
    pub fn from_config(config: &EngineConfig, id: &str) -> Self {
        Self::new(
            id,
            "0.0.0",
            config.plugin_install_path(id),
            config.plugin_profile_path(id),
        )
    }
}

impl Plugin for PluginInfo {
    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn install_path(&self) -> &Path {
        &self.install_path
    }

    fn profile_path(&self) -> &Path {
        &self.profile_path
    }
}
