use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use log::{debug, error, warn};

use crate::kernel::config::SettingsLayout;
use crate::plugin_system::traits::Plugin;
use crate::settings::document::{DocumentPhase, SettingsDocument};
use crate::settings::error::SettingsError;
use crate::settings::notifier::{ChangeNotifier, PendingChange};
use crate::settings::value::{SettingType, SettingValue};
use crate::settings::{InstanceId, OWN_SETTINGS_ID};
use crate::storage::gateway::DocumentGateway;
use crate::storage::tree::SettingsTree;

/// Outcome of the most recent schema load for one instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No load has been attempted yet
    NotLoaded,
    /// The last load failed; only a forced load tries again
    Failed,
    /// The schema was loaded and applied
    Loaded,
}

#[derive(Debug)]
struct StoreEntry {
    document: Option<SettingsDocument>,
    state: LoadState,
    has_user_settings: bool,
    user_settings_path: PathBuf,
}

impl StoreEntry {
    fn is_initialized(&self) -> bool {
        self.document.as_ref().is_some_and(SettingsDocument::is_initialized)
    }

    fn is_loaded(&self) -> bool {
        self.document.as_ref().is_some_and(SettingsDocument::is_loaded)
    }
}

/// Settings of one plugin: one lazily loaded document per instance id.
///
/// The store does no locking of its own. Callers sharing it between threads
/// wrap it in a mutex (see [`SettingsManager`](super::SettingsManager)).
pub struct SettingsStore {
    plugin_id: String,
    install_path: PathBuf,
    profile_path: PathBuf,
    owner: Weak<dyn Plugin>,
    layout: SettingsLayout,
    gateway: DocumentGateway,
    notifier: ChangeNotifier,
    entries: HashMap<InstanceId, StoreEntry>,
}

impl SettingsStore {
    /// Create the store for `plugin`. The plugin is referenced weakly.
    pub fn new(
        plugin: &Arc<dyn Plugin>,
        layout: SettingsLayout,
        gateway: DocumentGateway,
        notifier: ChangeNotifier,
    ) -> Self {
        Self {
            plugin_id: plugin.id().to_string(),
            install_path: plugin.install_path().to_path_buf(),
            profile_path: plugin.profile_path().to_path_buf(),
            owner: Arc::downgrade(plugin),
            layout,
            gateway,
            notifier,
            entries: HashMap::new(),
        }
    }

    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    /// Path of the user-values file of an instance
    pub fn user_settings_path(&self, id: InstanceId) -> PathBuf {
        match self.entries.get(&id) {
            Some(entry) => entry.user_settings_path.clone(),
            None => self.layout.user_settings_path(&self.profile_path, id),
        }
    }

    fn instance_phases(&self) -> BTreeMap<InstanceId, Option<DocumentPhase>> {
        self.entries
            .iter()
            .map(|(id, entry)| (*id, entry.document.as_ref().map(SettingsDocument::phase)))
            .collect()
    }

    /// Load state of an instance, without triggering a load
    pub fn load_state(&self, id: InstanceId) -> LoadState {
        self.entries
            .get(&id)
            .map(|entry| entry.state)
            .unwrap_or(LoadState::NotLoaded)
    }

    fn entry_for<'a>(
        entries: &'a mut HashMap<InstanceId, StoreEntry>,
        layout: &SettingsLayout,
        profile_path: &Path,
        id: InstanceId,
    ) -> &'a mut StoreEntry {
        entries.entry(id).or_insert_with(|| StoreEntry {
            document: None,
            state: LoadState::NotLoaded,
            has_user_settings: false,
            user_settings_path: layout.user_settings_path(profile_path, id),
        })
    }

    fn schema_path_for(&self, id: InstanceId) -> PathBuf {
        if id != OWN_SETTINGS_ID {
            let instance_schema = self.layout.instance_schema_path(&self.install_path);
            if self.gateway.file_exists(&instance_schema) {
                return instance_schema;
            }
        }
        self.layout.schema_path(&self.install_path)
    }

    fn document(&self, id: InstanceId) -> Option<&SettingsDocument> {
        self.entries.get(&id).and_then(|entry| entry.document.as_ref())
    }

    fn document_mut(&mut self, id: InstanceId) -> Option<&mut SettingsDocument> {
        self.entries.get_mut(&id).and_then(|entry| entry.document.as_mut())
    }

    /// Load the schema of an instance and, optionally, its user values.
    ///
    /// Succeeds immediately when the schema is already applied and `force`
    /// is not set. After a failed load, only a forced call touches the disk again.
    pub fn load_settings(&mut self, force: bool, load_user_values: bool, id: InstanceId) -> bool {
        {
            let entry = Self::entry_for(&mut self.entries, &self.layout, &self.profile_path, id);
            if entry.is_initialized() && !force {
                return true;
            }
            if entry.state == LoadState::Failed && !force {
                return false;
            }
        }

        let schema_path = self.schema_path_for(id);
        let entry = Self::entry_for(&mut self.entries, &self.layout, &self.profile_path, id);

        // Assume the load fails until the schema is applied
        entry.state = LoadState::Failed;

        if force {
            if let Some(document) = entry.document.as_mut() {
                document.uninitialize();
            }
        }

        let tree = match self.gateway.load_document(&schema_path) {
            Ok(tree) => tree,
            Err(e) if e.is_not_found() => {
                debug!("[{}] no settings schema at {}", self.plugin_id, schema_path.display());
                return false;
            }
            Err(e) => {
                error!("[{}] unable to load settings schema: {}", self.plugin_id, e);
                return false;
            }
        };

        let owner = self.owner.clone();
        let plugin_id = &self.plugin_id;
        let document = entry
            .document
            .get_or_insert_with(|| SettingsDocument::new(plugin_id.clone(), owner));
        if let Err(e) = document.initialize(&tree) {
            error!("[{}] failed to initialize plugin settings: {}", self.plugin_id, e);
            return false;
        }

        entry.state = LoadState::Loaded;

        if load_user_values {
            self.load_user_settings(id);
        }

        true
    }

    /// Force a reload of schema and user values
    pub fn reload_settings(&mut self, id: InstanceId) -> bool {
        self.load_settings(true, true, id)
    }

    /// Merge the user-values file into an initialized document.
    ///
    /// A missing file is not an error: the schema defaults stand.
    pub fn load_user_settings(&mut self, id: InstanceId) -> bool {
        let plugin_id = self.plugin_id.clone();
        let entry = match self.entries.get_mut(&id) {
            Some(entry) if entry.is_initialized() => entry,
            _ => return false,
        };

        entry.has_user_settings = false;

        if !self.gateway.file_exists(&entry.user_settings_path) {
            return match entry.document.as_mut().map(SettingsDocument::mark_loaded) {
                Some(Ok(())) => true,
                _ => false,
            };
        }

        let tree = match self.gateway.load_document(&entry.user_settings_path) {
            Ok(tree) => tree,
            Err(e) => {
                error!(
                    "[{}] failed to load plugin settings from {}: {}",
                    plugin_id,
                    entry.user_settings_path.display(),
                    e
                );
                return false;
            }
        };

        self.settings_from_tree(&tree, false, id)
    }

    /// Apply a parsed tree to an instance's document.
    ///
    /// An uninitialized document takes its schema from the same tree. With
    /// `reset_to_defaults` every cell starts from its default. Values merged
    /// before a failing entry are kept.
    pub fn settings_from_tree(&mut self, tree: &SettingsTree, reset_to_defaults: bool, id: InstanceId) -> bool {
        if tree.root().is_none() {
            return false;
        }

        let owner = self.owner.clone();
        let plugin_id = self.plugin_id.clone();
        let entry = Self::entry_for(&mut self.entries, &self.layout, &self.profile_path, id);
        let document = entry
            .document
            .get_or_insert_with(|| SettingsDocument::new(plugin_id.clone(), owner));

        if !document.is_initialized() {
            if let Err(e) = document.initialize(tree) {
                error!("[{}] failed to initialize plugin settings: {}", plugin_id, e);
                return false;
            }
            entry.state = LoadState::Loaded;
        }

        if reset_to_defaults {
            document.set_defaults();
        }

        match document.load_values(tree) {
            Ok(applied) => {
                debug!("[{}] merged {} user value(s) into instance {}", plugin_id, applied, id);
                entry.has_user_settings = true;
                true
            }
            Err(e) => {
                error!("[{}] failed to load user settings: {}", plugin_id, e);
                false
            }
        }
    }

    /// Materialize an instance's current values
    pub fn settings_to_tree(&self, id: InstanceId) -> Option<SettingsTree> {
        let document = self.document(id).filter(|d| d.is_initialized())?;
        match document.to_tree() {
            Ok(tree) => Some(tree),
            Err(e) => {
                error!("[{}] failed to save plugin settings: {}", self.plugin_id, e);
                None
            }
        }
    }

    /// Whether the plugin's own settings declare anything
    pub fn can_have_settings(&mut self) -> bool {
        self.has_settings(OWN_SETTINGS_ID)
    }

    pub fn has_settings(&mut self, id: InstanceId) -> bool {
        self.load_settings(false, true, id) && self.document(id).is_some_and(SettingsDocument::has_settings)
    }

    pub fn settings_initialized(&self, id: InstanceId) -> bool {
        self.entries.get(&id).is_some_and(StoreEntry::is_initialized)
    }

    pub fn settings_loaded(&self, id: InstanceId) -> bool {
        self.entries.get(&id).is_some_and(StoreEntry::is_loaded)
    }

    /// Whether user values were applied to (or saved from) a loaded document
    pub fn has_user_settings(&mut self, id: InstanceId) -> bool {
        if !self.load_settings(false, true, id) {
            return false;
        }
        self.entries
            .get(&id)
            .is_some_and(|entry| entry.is_loaded() && entry.has_user_settings)
    }

    /// Drop the in-memory document; the next access reloads it from disk
    pub fn reset_settings(&mut self, id: InstanceId) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.document = None;
        }
    }

    /// Textual value of a setting, empty when unknown or unavailable
    pub fn get_setting(&mut self, key: &str, id: InstanceId) -> String {
        if key.is_empty() || !self.load_settings(false, true, id) {
            return String::new();
        }
        self.document(id)
            .and_then(|document| document.get(key))
            .map(|cell| cell.to_text())
            .unwrap_or_default()
    }

    /// Typed value of a setting; `None` unless the cell's kind matches `T`
    pub fn get_setting_as<T: SettingType>(&mut self, key: &str, id: InstanceId) -> Option<T> {
        if key.is_empty() || !self.has_settings(id) {
            return None;
        }
        let cell = self.document(id)?.get(key)?;
        if cell.kind() != T::KIND {
            return None;
        }
        cell.get::<T>()
    }

    pub fn get_setting_bool(&mut self, key: &str, id: InstanceId) -> Option<bool> {
        self.get_setting_as(key, id)
    }

    pub fn get_setting_int(&mut self, key: &str, id: InstanceId) -> Option<i64> {
        self.get_setting_as(key, id)
    }

    pub fn get_setting_number(&mut self, key: &str, id: InstanceId) -> Option<f64> {
        self.get_setting_as(key, id)
    }

    pub fn get_setting_string(&mut self, key: &str, id: InstanceId) -> Option<String> {
        self.get_setting_as(key, id)
    }

    /// Set a setting from text, parsed as the cell's kind.
    ///
    /// Unknown keys get a new string cell. Returns whether the value was stored.
    pub fn update_setting(&mut self, key: &str, value: &str, id: InstanceId) -> bool {
        if key.is_empty() || !self.load_settings(false, true, id) {
            return false;
        }
        let plugin_id = self.plugin_id.clone();
        let document = match self.document_mut(id) {
            Some(document) => document,
            None => return false,
        };

        if document.get(key).is_none() {
            if let Err(e) = document.add_setting(key, SettingValue::String(value.to_string())) {
                error!("[{}] failed to add undefined setting \"{}\": {}", plugin_id, key, e);
                return false;
            }
            return true;
        }

        match document.get_mut(key).map(|cell| cell.set_from_text(value)) {
            Some(Ok(())) => true,
            Some(Err(e)) => {
                warn!("[{}] rejected value for setting \"{}\": {}", plugin_id, key, e);
                false
            }
            None => false,
        }
    }

    /// Set a typed value. Unknown keys get a new cell of `T`'s kind; an
    /// existing cell of another kind is left alone.
    pub fn update_setting_as<T: SettingType>(&mut self, key: &str, value: T, id: InstanceId) -> bool {
        if key.is_empty() || !self.has_settings(id) {
            return false;
        }
        let plugin_id = self.plugin_id.clone();
        let document = match self.document_mut(id) {
            Some(document) => document,
            None => return false,
        };

        let value = value.into_value();
        if document.get(key).is_none() {
            if let Err(e) = document.add_setting(key, value.clone()) {
                error!("[{}] failed to add undefined setting \"{}\": {}", plugin_id, key, e);
                return false;
            }
        }

        match document.get_mut(key) {
            Some(cell) if cell.kind() == T::KIND => cell.set_value(key, value).is_ok(),
            _ => false,
        }
    }

    pub fn update_setting_bool(&mut self, key: &str, value: bool, id: InstanceId) -> bool {
        self.update_setting_as(key, value, id)
    }

    pub fn update_setting_int(&mut self, key: &str, value: i64, id: InstanceId) -> bool {
        self.update_setting_as(key, value, id)
    }

    pub fn update_setting_number(&mut self, key: &str, value: f64, id: InstanceId) -> bool {
        self.update_setting_as(key, value, id)
    }

    pub fn update_setting_string(&mut self, key: &str, value: impl Into<String>, id: InstanceId) -> bool {
        self.update_setting_as(key, value.into(), id)
    }

    /// Return every setting of a loaded instance to its schema default
    pub fn restore_defaults(&mut self, id: InstanceId) -> bool {
        if !self.load_settings(false, true, id) {
            return false;
        }
        match self.document_mut(id) {
            Some(document) if document.is_loaded() => {
                document.set_defaults();
                true
            }
            _ => false,
        }
    }

    /// Setting keys of an instance in document order
    pub fn setting_keys(&mut self, id: InstanceId) -> Vec<String> {
        if !self.load_settings(false, true, id) {
            return Vec::new();
        }
        self.document(id)
            .map(|document| document.keys().to_vec())
            .unwrap_or_default()
    }

    /// Read-only view of an instance's document, loading it if needed
    pub fn settings(&mut self, id: InstanceId) -> Option<&SettingsDocument> {
        if !self.load_settings(false, true, id) {
            return None;
        }
        self.document(id)
    }

    /// Write an instance's values to its user-values file and notify listeners.
    ///
    /// Listeners run before this returns. When the store sits behind a lock
    /// that listeners may take as well, use [`SettingsStore::write_settings`]
    /// and dispatch the change after unlocking.
    pub fn save_settings(&mut self, id: InstanceId) -> Result<(), SettingsError> {
        if let Some(change) = self.write_settings(id)? {
            change.dispatch();
        }
        Ok(())
    }

    /// Write an instance's values to its user-values file.
    ///
    /// Does nothing unless the document is loaded. The profile directory and
    /// its parent are created first if missing. The instance counts as having
    /// user settings afterwards even if the write failed. A successful write
    /// returns the change notification, still to be dispatched.
    pub fn write_settings(&mut self, id: InstanceId) -> Result<Option<PendingChange>, SettingsError> {
        if !self.settings_loaded(id) {
            return Ok(None);
        }
        let entry = match self.entries.get_mut(&id) {
            Some(entry) => entry,
            None => return Ok(None),
        };

        let profile_dir = entry.user_settings_path.parent().map(Path::to_path_buf);
        let root_dir = profile_dir.as_deref().and_then(Path::parent).map(Path::to_path_buf);
        for dir in [root_dir, profile_dir].into_iter().flatten() {
            if dir.as_os_str().is_empty() || self.gateway.dir_exists(&dir) {
                continue;
            }
            if let Err(e) = self.gateway.ensure_dir(&dir) {
                warn!("[{}] unable to create {}: {}", self.plugin_id, dir.display(), e);
            }
        }

        let result = match entry.document.as_ref().map(SettingsDocument::to_tree) {
            Some(Ok(tree)) => self.gateway.save_document(&tree, &entry.user_settings_path),
            Some(Err(e)) => Err(e),
            None => Err(SettingsError::NotInitialized),
        };

        entry.has_user_settings = true;

        match result {
            Ok(()) => Ok(Some(self.notifier.pending(&self.plugin_id, id))),
            Err(e) => {
                error!("[{}] failed to save plugin settings: {}", self.plugin_id, e);
                Err(e)
            }
        }
    }
}

impl fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsStore")
            .field("plugin_id", &self.plugin_id)
            .field("install_path", &self.install_path)
            .field("profile_path", &self.profile_path)
            .field("instances", &self.instance_phases())
            .field("notifier", &self.notifier)
            .finish()
    }
}
