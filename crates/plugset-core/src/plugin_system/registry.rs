use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, warn};

use crate::kernel::error::{Error, Result};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::Plugin;
use crate::settings::InstanceId;
use crate::settings::notifier::InstanceSettingsListener;

/// Registry of known plugins, keyed by id
#[derive(Default)]
pub struct PluginRegistry {
    plugins: RwLock<HashMap<String, Arc<dyn Plugin>>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<dyn Plugin>>> {
        self.plugins.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<dyn Plugin>>> {
        self.plugins.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a plugin.
    ///
    /// The id names the plugin's install and profile directories, so it must
    /// be a single path component.
    pub fn register(&self, plugin: Arc<dyn Plugin>) -> Result<()> {
        let id = plugin.id().to_string();
        if let Some(message) = invalid_id_reason(&id) {
            return Err(Error::PluginSystem(PluginSystemError::RegistrationError {
                plugin_id: id,
                message: message.to_string(),
            }));
        }

        let mut plugins = self.write();
        if plugins.contains_key(&id) {
            return Err(Error::PluginSystem(PluginSystemError::AlreadyRegistered { plugin_id: id }));
        }
        debug!("Registered plugin '{}' ({})", id, plugin.version());
        plugins.insert(id, plugin);
        Ok(())
    }

    /// Unregister a plugin by ID
    pub fn unregister(&self, id: &str) -> Result<Arc<dyn Plugin>> {
        self.write().remove(id).ok_or_else(|| {
            Error::PluginSystem(PluginSystemError::NotFound {
                plugin_id: id.to_string(),
            })
        })
    }

    pub fn has_plugin(&self, id: &str) -> bool {
        self.read().contains_key(id)
    }

    pub fn get_plugin(&self, id: &str) -> Option<Arc<dyn Plugin>> {
        self.read().get(id).cloned()
    }

    /// Registered plugin ids, sorted
    pub fn plugin_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

fn invalid_id_reason(id: &str) -> Option<&'static str> {
    if id.trim().is_empty() {
        Some("plugin id must not be empty")
    } else if id.contains(['/', '\\']) {
        Some("plugin id must not contain path separators")
    } else if id.contains("..") {
        Some("plugin id must not contain '..'")
    } else {
        None
    }
}

impl InstanceSettingsListener for PluginRegistry {
    fn notify_instance_settings_changed(&self, plugin_id: &str, instance_id: InstanceId) {
        // Release the lock before calling into the plugin
        let plugin = self.get_plugin(plugin_id);
        match plugin {
            Some(plugin) => plugin.on_settings_changed(instance_id),
            None => warn!(
                "Settings of unregistered plugin '{}' changed (instance {})",
                plugin_id, instance_id
            ),
        }
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugin_ids())
            .finish()
    }
}
