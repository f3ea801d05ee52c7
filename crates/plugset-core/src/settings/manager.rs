use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use log::{debug, info};

use crate::kernel::component::KernelComponent;
use crate::kernel::config::EngineConfig;
use crate::kernel::error::{Error, LifecyclePhase, Result};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::traits::Plugin;
use crate::settings::notifier::{ChangeNotifier, ScriptEngineObserver};
use crate::settings::InstanceId;
use crate::settings::store::SettingsStore;
use crate::storage::gateway::DocumentGateway;
use crate::storage::provider::StorageProvider;

/// A plugin's store, shared behind its own lock
pub type SharedSettingsStore = Arc<Mutex<SettingsStore>>;

/// Owns one settings store per plugin and wires the shared collaborators into each.
///
/// Every store sits behind its own mutex, so operations on different plugins
/// never contend. Holding a store's lock across a write and a later load gives
/// read-your-writes consistency for that plugin. Change listeners run with the
/// lock released (see [`SettingsManager::save_settings`]).
pub struct SettingsManager {
    name: &'static str,
    config: EngineConfig,
    provider: Arc<dyn StorageProvider>,
    registry: Arc<PluginRegistry>,
    script_engine: Option<Arc<dyn ScriptEngineObserver>>,
    stores: Mutex<HashMap<String, SharedSettingsStore>>,
}

impl SettingsManager {
    pub fn new(config: EngineConfig, provider: Arc<dyn StorageProvider>, registry: Arc<PluginRegistry>) -> Self {
        Self {
            name: "SettingsManager",
            config,
            provider,
            registry,
            script_engine: None,
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// Register the scripting engine that must hear about settings changes
    pub fn with_script_engine(mut self, engine: Arc<dyn ScriptEngineObserver>) -> Self {
        self.script_engine = Some(engine);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    fn lock_stores(&self) -> MutexGuard<'_, HashMap<String, SharedSettingsStore>> {
        self.stores.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn notifier(&self) -> ChangeNotifier {
        let notifier = ChangeNotifier::new(self.registry.clone());
        match &self.script_engine {
            Some(engine) => notifier.with_script_engine(engine.clone()),
            None => notifier,
        }
    }

    /// The store of `plugin`, created on first use
    pub fn store(&self, plugin: &Arc<dyn Plugin>) -> SharedSettingsStore {
        let mut stores = self.lock_stores();
        stores
            .entry(plugin.id().to_string())
            .or_insert_with(|| {
                debug!("Creating settings store for plugin '{}'", plugin.id());
                Arc::new(Mutex::new(SettingsStore::new(
                    plugin,
                    self.config.layout.clone(),
                    DocumentGateway::new(self.provider.clone()),
                    self.notifier(),
                )))
            })
            .clone()
    }

    /// The store of a registered plugin, looked up by id
    pub fn store_by_id(&self, plugin_id: &str) -> Result<SharedSettingsStore> {
        let plugin = self.registry.get_plugin(plugin_id).ok_or_else(|| {
            Error::PluginSystem(PluginSystemError::NotFound {
                plugin_id: plugin_id.to_string(),
            })
        })?;
        Ok(self.store(&plugin))
    }

    /// Save an instance of a registered plugin, then notify listeners once the
    /// store is unlocked again so they can read the new values.
    pub fn save_settings(&self, plugin_id: &str, id: InstanceId) -> Result<()> {
        let shared = self.store_by_id(plugin_id)?;
        let pending = {
            let mut store = shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            store.write_settings(id)?
        };
        if let Some(change) = pending {
            change.dispatch();
        }
        Ok(())
    }

    pub fn has_store(&self, plugin_id: &str) -> bool {
        self.lock_stores().contains_key(plugin_id)
    }

    /// Drop a plugin's store together with every cached document
    pub fn forget(&self, plugin_id: &str) -> bool {
        self.lock_stores().remove(plugin_id).is_some()
    }

    /// Forward the post-uninstall hook and drop the plugin's store
    pub fn on_post_uninstall(&self, plugin: &Arc<dyn Plugin>) {
        crate::plugin_system::lifecycle::on_post_uninstall(plugin);
        if self.forget(plugin.id()) {
            info!("Dropped settings of uninstalled plugin '{}'", plugin.id());
        }
    }
}

impl Debug for SettingsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsManager")
            .field("name", &self.name)
            .field("provider", &self.provider.name())
            .field("install_root", &self.config.install_root)
            .field("profile_root", &self.config.profile_root)
            .field("script_engine", &self.script_engine.is_some())
            .finish()
    }
}

#[async_trait]
impl KernelComponent for SettingsManager {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn initialize(&self) -> Result<()> {
        // Profiles are written below this root; plugin directories are created on save
        self.provider
            .create_dir_all(&self.config.profile_root)
            .map_err(|e| Error::lifecycle(self.name, LifecyclePhase::Initialize, "cannot create profile root", Some(e.into())))
    }

    async fn start(&self) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let dropped = {
            let mut stores = self.lock_stores();
            let count = stores.len();
            stores.clear();
            count
        };
        debug!("Released {} settings store(s)", dropped);
        Ok(())
    }
}
