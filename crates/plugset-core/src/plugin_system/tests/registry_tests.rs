use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::kernel::error::Error;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::traits::{Plugin, PluginInfo};
use crate::settings::InstanceId;
use crate::settings::notifier::InstanceSettingsListener;

// --- Mock Plugin for Registry Tests ---
struct MockRegistryPlugin {
    id: String,
    install_path: PathBuf,
    profile_path: PathBuf,
    changed: Mutex<Vec<InstanceId>>,
}

impl MockRegistryPlugin {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            install_path: PathBuf::from("plugins").join(id),
            profile_path: PathBuf::from("profiles").join(id),
            changed: Mutex::new(Vec::new()),
        }
    }
}

impl Plugin for MockRegistryPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> &str {
        "2.1.0"
    }

    fn install_path(&self) -> &Path {
        &self.install_path
    }

    fn profile_path(&self) -> &Path {
        &self.profile_path
    }

    fn on_settings_changed(&self, instance_id: InstanceId) {
        self.changed.lock().expect("changed lock").push(instance_id);
    }
}

#[test]
fn test_register_and_lookup() {
    let registry = PluginRegistry::new();
    assert!(registry.is_empty());

    registry.register(Arc::new(MockRegistryPlugin::new("plugin.b"))).expect("register b");
    registry.register(Arc::new(MockRegistryPlugin::new("plugin.a"))).expect("register a");

    assert_eq!(registry.len(), 2);
    assert!(registry.has_plugin("plugin.a"));
    assert!(!registry.has_plugin("plugin.c"));
    assert_eq!(registry.plugin_ids(), vec!["plugin.a", "plugin.b"]);
    assert_eq!(registry.get_plugin("plugin.b").map(|p| p.version().to_string()).as_deref(), Some("2.1.0"));
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let registry = PluginRegistry::new();
    registry.register(Arc::new(MockRegistryPlugin::new("plugin.a"))).expect("first");

    let err = registry.register(Arc::new(MockRegistryPlugin::new("plugin.a"))).unwrap_err();
    assert!(matches!(
        err,
        Error::PluginSystem(PluginSystemError::AlreadyRegistered { ref plugin_id }) if plugin_id == "plugin.a"
    ));
}

#[test]
fn test_empty_id_is_rejected() {
    let registry = PluginRegistry::new();
    let err = registry
        .register(Arc::new(PluginInfo::new("  ", "1.0.0", "install", "profile")))
        .unwrap_err();
    assert!(matches!(err, Error::PluginSystem(PluginSystemError::RegistrationError { .. })));
    assert!(registry.is_empty());
}

#[test]
fn test_ids_that_leave_the_plugin_roots_are_rejected() {
    let registry = PluginRegistry::new();
    for id in ["../x", "plugin/sub", "plugin\\sub", "..", "plugin..up"] {
        let err = registry
            .register(Arc::new(MockRegistryPlugin::new(id)))
            .unwrap_err();
        match err {
            Error::PluginSystem(PluginSystemError::RegistrationError { plugin_id, .. }) => assert_eq!(plugin_id, id),
            other => panic!("expected a registration error for '{}', got {:?}", id, other),
        }
    }
    assert!(registry.is_empty());

    registry
        .register(Arc::new(MockRegistryPlugin::new("plugin.video.ok")))
        .expect("dotted ids are fine");
}

#[test]
fn test_unregister() {
    let registry = PluginRegistry::new();
    registry.register(Arc::new(MockRegistryPlugin::new("plugin.a"))).expect("register");

    let removed = registry.unregister("plugin.a").expect("unregister");
    assert_eq!(removed.id(), "plugin.a");
    assert!(!registry.has_plugin("plugin.a"));

    let err = registry.unregister("plugin.a").unwrap_err();
    assert!(matches!(err, Error::PluginSystem(PluginSystemError::NotFound { .. })));
}

#[test]
fn test_settings_change_is_forwarded_to_plugin() {
    let registry = PluginRegistry::new();
    let plugin = Arc::new(MockRegistryPlugin::new("plugin.a"));
    registry.register(plugin.clone()).expect("register");

    registry.notify_instance_settings_changed("plugin.a", 0);
    registry.notify_instance_settings_changed("plugin.a", 2);
    // Unknown plugins are only logged
    registry.notify_instance_settings_changed("plugin.unknown", 1);

    assert_eq!(*plugin.changed.lock().expect("changed lock"), vec![0, 2]);
}
