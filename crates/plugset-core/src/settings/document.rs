use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Weak;

use log::{debug, warn};

use crate::kernel::constants::{SETTING_ELEMENT, SETTINGS_ROOT, VALUES_FORMAT_VERSION};
use crate::plugin_system::traits::Plugin;
use crate::settings::error::SettingsError;
use crate::settings::value::{SettingCell, SettingKind, SettingValue};
use crate::storage::tree::{Element, SettingsTree};

/// Lifecycle of a [`SettingsDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentPhase {
    /// No schema has been applied
    Uninitialized,
    /// The schema is applied and every cell holds its default
    Initialized,
    /// User values were merged, or the defaults were accepted as-is
    Loaded,
}

/// Ordered mapping of setting key to typed cell for one plugin instance
#[derive(Debug, Clone)]
pub struct SettingsDocument {
    plugin_id: String,
    owner: Weak<dyn Plugin>,
    phase: DocumentPhase,
    order: Vec<String>,
    cells: HashMap<String, SettingCell>,
}

impl SettingsDocument {
    /// Create an empty document. `owner` is only consulted, never kept alive.
    pub fn new(plugin_id: impl Into<String>, owner: Weak<dyn Plugin>) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            owner,
            phase: DocumentPhase::Uninitialized,
            order: Vec::new(),
            cells: HashMap::new(),
        }
    }

    pub fn phase(&self) -> DocumentPhase {
        self.phase
    }

    pub fn is_initialized(&self) -> bool {
        self.phase != DocumentPhase::Uninitialized
    }

    pub fn is_loaded(&self) -> bool {
        self.phase == DocumentPhase::Loaded
    }

    pub fn has_settings(&self) -> bool {
        !self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Setting keys in document order
    pub fn keys(&self) -> &[String] {
        &self.order
    }

    pub fn get(&self, key: &str) -> Option<&SettingCell> {
        self.cells.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut SettingCell> {
        self.cells.get_mut(key)
    }

    /// Cells in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingCell)> {
        self.order
            .iter()
            .filter_map(|key| self.cells.get(key).map(|cell| (key.as_str(), cell)))
    }

    /// Apply a schema tree. On error the document is left untouched.
    pub fn initialize(&mut self, tree: &SettingsTree) -> Result<(), SettingsError> {
        if self.is_initialized() {
            return Err(SettingsError::SchemaInit("document is already initialized".to_string()));
        }
        let root = tree
            .root()
            .ok_or_else(|| SettingsError::SchemaInit("document has no root element".to_string()))?;
        if root.name != SETTINGS_ROOT {
            return Err(SettingsError::SchemaInit(format!(
                "root element is <{}>, expected <{}>",
                root.name, SETTINGS_ROOT
            )));
        }

        let mut order = Vec::new();
        let mut cells = HashMap::new();
        let mut seen = HashSet::new();

        for definition in root.descendants_named(SETTING_ELEMENT) {
            let id = match definition.attribute("id") {
                Some(id) => id.trim(),
                None => continue,
            };
            if id.is_empty() {
                return Err(SettingsError::SchemaInit("setting with an empty id".to_string()));
            }
            let kind = match SettingKind::from_schema_type(definition.attribute("type")) {
                Some(kind) => kind,
                None => continue,
            };
            if !seen.insert(id.to_string()) {
                return Err(SettingsError::SchemaInit(format!("duplicate setting id '{}'", id)));
            }

            let default = self.resolve_default(id, kind, definition)?;
            order.push(id.to_string());
            cells.insert(id.to_string(), SettingCell::defined(default));
        }

        debug!("[{}] settings schema declares {} setting(s)", self.plugin_id, order.len());
        self.order = order;
        self.cells = cells;
        self.phase = DocumentPhase::Initialized;
        Ok(())
    }

    fn resolve_default(
        &self,
        id: &str,
        kind: SettingKind,
        definition: &Element,
    ) -> Result<SettingValue, SettingsError> {
        let declared = definition
            .attribute("default")
            .map(str::to_string)
            .or_else(|| definition.child("default").map(|d| d.text.clone()));

        // The owning plugin gets the last word on defaults
        let resolved = match self.owner.upgrade() {
            Some(owner) => owner.default_setting(id).or(declared),
            None => declared,
        };

        match resolved {
            Some(text) => SettingValue::parse(kind, &text).map_err(|e| {
                SettingsError::SchemaInit(format!("default of setting '{}': {}", id, e))
            }),
            None => Ok(kind.zero_value()),
        }
    }

    /// Drop the schema and every cell
    pub fn uninitialize(&mut self) {
        self.order.clear();
        self.cells.clear();
        self.phase = DocumentPhase::Uninitialized;
    }

    /// Accept the current values as loaded
    pub fn mark_loaded(&mut self) -> Result<(), SettingsError> {
        if !self.is_initialized() {
            return Err(SettingsError::NotInitialized);
        }
        self.phase = DocumentPhase::Loaded;
        Ok(())
    }

    /// Return every cell to its default
    pub fn set_defaults(&mut self) {
        for cell in self.cells.values_mut() {
            cell.reset();
        }
    }

    /// Merge values from a user-values tree.
    ///
    /// Values are applied one by one. A value that fails to parse aborts the
    /// merge, and the values applied before it are kept. Entries without a
    /// matching key are ignored. Returns the number of values applied.
    pub fn load_values(&mut self, tree: &SettingsTree) -> Result<usize, SettingsError> {
        if !self.is_initialized() {
            return Err(SettingsError::NotInitialized);
        }
        let root = tree
            .root()
            .ok_or_else(|| SettingsError::MergeFailed {
                key: String::new(),
                message: "document has no root element".to_string(),
            })?;

        let mut applied = 0;
        for entry in root.children_named(SETTING_ELEMENT) {
            let key = match entry.attribute("id") {
                Some(key) if !key.trim().is_empty() => key.trim(),
                _ => continue,
            };
            let text = match entry.attribute("value") {
                Some(value) => value,
                // Entries with a type and no value are definitions, not values
                None if entry.has_attribute("type") => continue,
                None => entry.text.as_str(),
            };

            match self.cells.get_mut(key) {
                Some(cell) => {
                    cell.set_from_text(text).map_err(|e| SettingsError::MergeFailed {
                        key: key.to_string(),
                        message: e.to_string(),
                    })?;
                    applied += 1;
                }
                None => debug!("[{}] ignoring value for undeclared setting '{}'", self.plugin_id, key),
            }
        }

        self.phase = DocumentPhase::Loaded;
        Ok(applied)
    }

    /// Materialize the current values as a user-values tree
    pub fn to_tree(&self) -> Result<SettingsTree, SettingsError> {
        if !self.is_initialized() {
            return Err(SettingsError::NotInitialized);
        }
        let mut root = Element::new(SETTINGS_ROOT).with_attribute("version", VALUES_FORMAT_VERSION);
        for (key, cell) in self.iter() {
            let mut entry = Element::new(SETTING_ELEMENT)
                .with_attribute("id", key)
                .with_text(cell.to_text());
            if cell.is_default() {
                entry = entry.with_attribute("default", "true");
            }
            root.children.push(entry);
        }
        Ok(SettingsTree::new(root))
    }

    /// Add a cell for a key the schema does not declare
    pub fn add_setting(&mut self, key: &str, value: SettingValue) -> Result<&mut SettingCell, SettingsError> {
        if !self.is_initialized() {
            return Err(SettingsError::NotInitialized);
        }
        if !is_valid_key(key) {
            warn!("[{}] refusing to add setting with invalid key {:?}", self.plugin_id, key);
            return Err(SettingsError::KeyNotFound(key.to_string()));
        }
        if !self.cells.contains_key(key) {
            self.order.push(key.to_string());
            self.cells.insert(key.to_string(), SettingCell::undefined(value));
        }
        self.cells
            .get_mut(key)
            .ok_or_else(|| SettingsError::KeyNotFound(key.to_string()))
    }
}

/// Keys must be non-empty, free of surrounding whitespace and of control characters
fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.trim() == key && !key.chars().any(char::is_control)
}
