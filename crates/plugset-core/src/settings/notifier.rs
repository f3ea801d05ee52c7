use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::settings::InstanceId;

/// Receives "settings of this plugin instance changed" from the store.
///
/// The plugin registry implements this to push new values to the running plugin.
pub trait InstanceSettingsListener: Send + Sync {
    fn notify_instance_settings_changed(&self, plugin_id: &str, instance_id: InstanceId);
}

/// An embedded scripting engine that must be told when a plugin's settings change
pub trait ScriptEngineObserver: Send + Sync {
    /// Whether the engine is running in this process. Inactive engines are skipped.
    fn is_active(&self) -> bool {
        true
    }

    fn notify_settings_changed(&self, plugin_id: &str);
}

/// Fans a successful save out to the registry and, if present, the scripting engine
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    registry: Option<Arc<dyn InstanceSettingsListener>>,
    script_engine: Option<Arc<dyn ScriptEngineObserver>>,
}

impl ChangeNotifier {
    pub fn new(registry: Arc<dyn InstanceSettingsListener>) -> Self {
        Self {
            registry: Some(registry),
            script_engine: None,
        }
    }

    /// A notifier that tells nobody
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn with_script_engine(mut self, engine: Arc<dyn ScriptEngineObserver>) -> Self {
        self.script_engine = Some(engine);
        self
    }

    pub fn has_script_engine(&self) -> bool {
        self.script_engine.is_some()
    }

    /// A change announcement that is held back until [`PendingChange::dispatch`]
    pub fn pending(&self, plugin_id: &str, instance_id: InstanceId) -> PendingChange {
        PendingChange {
            notifier: self.clone(),
            plugin_id: plugin_id.to_string(),
            instance_id,
        }
    }

    pub fn settings_changed(&self, plugin_id: &str, instance_id: InstanceId) {
        debug!("[{}] settings of instance {} changed", plugin_id, instance_id);
        if let Some(registry) = &self.registry {
            registry.notify_instance_settings_changed(plugin_id, instance_id);
        }
        if let Some(engine) = &self.script_engine {
            if engine.is_active() {
                engine.notify_settings_changed(plugin_id);
            }
        }
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("registry", &self.registry.is_some())
            .field("script_engine", &self.script_engine.is_some())
            .finish()
    }
}

/// A saved change whose listeners have not been told yet.
///
/// Listeners usually read the new values back, so dispatch only after the
/// lock guarding the store has been released.
#[must_use = "listeners only hear about the change once it is dispatched"]
#[derive(Debug)]
pub struct PendingChange {
    notifier: ChangeNotifier,
    plugin_id: String,
    instance_id: InstanceId,
}

impl PendingChange {
    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    pub fn dispatch(self) {
        self.notifier.settings_changed(&self.plugin_id, self.instance_id);
    }
}
