use plugset_core::settings::{InstanceId, PendingChange, SettingsError, SettingsStore};
use plugset_core::{Error, SettingsManager};

use crate::Commands;

/// Run one subcommand against the store of `plugin_id`.
///
/// Saved changes are announced after the store lock is released.
pub(crate) fn execute(manager: &SettingsManager, plugin_id: &str, command: Commands) -> Result<(), Error> {
    let shared = manager.store_by_id(plugin_id)?;
    let pending = {
        let mut store = shared
            .lock()
            .map_err(|_| Error::from(format!("settings store of '{}' is poisoned", plugin_id)))?;

        match command {
            Commands::List { instance, .. } => list(&mut store, instance).map(|()| None),
            Commands::Get { key, instance, .. } => get(&mut store, &key, instance).map(|()| None),
            Commands::Set { key, value, instance, .. } => set(&mut store, &key, &value, instance),
            Commands::Defaults { instance, .. } => defaults(&mut store, instance),
        }?
    };

    if let Some(change) = pending {
        change.dispatch();
    }
    Ok(())
}

fn no_settings(plugin_id: &str, instance: InstanceId) -> Error {
    Error::from(format!("plugin '{}' has no settings for instance {}", plugin_id, instance))
}

fn list(store: &mut SettingsStore, instance: InstanceId) -> Result<(), Error> {
    let plugin_id = store.plugin_id().to_string();
    let document = store
        .settings(instance)
        .ok_or_else(|| no_settings(&plugin_id, instance))?;

    if document.is_empty() {
        println!("Plugin '{}' declares no settings.", plugin_id);
        return Ok(());
    }
    for (key, cell) in document.iter() {
        let marker = if cell.is_default() { "" } else { " (modified)" };
        println!("{} = {}{}", key, cell.to_text(), marker);
    }
    Ok(())
}

fn get(store: &mut SettingsStore, key: &str, instance: InstanceId) -> Result<(), Error> {
    let plugin_id = store.plugin_id().to_string();
    let document = store
        .settings(instance)
        .ok_or_else(|| no_settings(&plugin_id, instance))?;
    let cell = document
        .get(key)
        .ok_or_else(|| SettingsError::KeyNotFound(key.to_string()))?;
    println!("{}", cell.to_text());
    Ok(())
}

fn set(store: &mut SettingsStore, key: &str, value: &str, instance: InstanceId) -> Result<Option<PendingChange>, Error> {
    if store.settings(instance).is_none() {
        return Err(no_settings(store.plugin_id(), instance));
    }
    if !store.update_setting(key, value, instance) {
        return Err(Error::from(format!("'{}' was rejected for setting '{}'", value, key)));
    }
    let pending = store.write_settings(instance)?;
    println!("{} = {}", key, store.get_setting(key, instance));
    Ok(pending)
}

fn defaults(store: &mut SettingsStore, instance: InstanceId) -> Result<Option<PendingChange>, Error> {
    if !store.restore_defaults(instance) {
        return Err(no_settings(store.plugin_id(), instance));
    }
    let pending = store.write_settings(instance)?;
    println!("Restored default settings of '{}'", store.plugin_id());
    Ok(pending)
}
