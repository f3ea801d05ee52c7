//! Shared fixtures for the settings tests
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::{TempDir, tempdir};

use crate::kernel::config::SettingsLayout;
use crate::plugin_system::traits::Plugin;
use crate::settings::InstanceId;
use crate::settings::notifier::{ChangeNotifier, InstanceSettingsListener, ScriptEngineObserver};
use crate::settings::store::SettingsStore;
use crate::storage::error::StorageResult;
use crate::storage::gateway::DocumentGateway;
use crate::storage::local::LocalStorageProvider;
use crate::storage::provider::StorageProvider;

pub const PLUGIN_ID: &str = "plugin.audio.test";

pub const SCHEMA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<settings>
    <category id="general" label="General">
        <setting id="enabled" type="bool" default="true" />
        <setting id="volume" type="int" default="50" />
        <setting id="ratio" type="number" default="0.5" />
        <setting id="name" type="text" default="guest" />
        <setting id="refresh" type="action" />
        <setting type="sep" />
    </category>
</settings>
"#;

/// A plugin whose hooks record what happened to it
#[derive(Debug, Default)]
pub struct TestPlugin {
    pub id: String,
    pub install_path: PathBuf,
    pub profile_path: PathBuf,
    pub default_overrides: HashMap<String, String>,
    pub changed_instances: Mutex<Vec<InstanceId>>,
    pub uninstalled: AtomicBool,
}

impl TestPlugin {
    pub fn new(id: &str, install_path: PathBuf, profile_path: PathBuf) -> Self {
        Self {
            id: id.to_string(),
            install_path,
            profile_path,
            ..Default::default()
        }
    }

    pub fn with_default(mut self, key: &str, value: &str) -> Self {
        self.default_overrides.insert(key.to_string(), value.to_string());
        self
    }

    pub fn changes(&self) -> Vec<InstanceId> {
        self.changed_instances.lock().expect("changes lock").clone()
    }
}

impl Plugin for TestPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn install_path(&self) -> &Path {
        &self.install_path
    }

    fn profile_path(&self) -> &Path {
        &self.profile_path
    }

    fn default_setting(&self, key: &str) -> Option<String> {
        self.default_overrides.get(key).cloned()
    }

    fn on_settings_changed(&self, instance_id: InstanceId) {
        self.changed_instances.lock().expect("changes lock").push(instance_id);
    }

    fn on_post_uninstall(&self) {
        self.uninstalled.store(true, Ordering::SeqCst);
    }
}

/// Local storage that counts every existence check and read, and remembers created directories
#[derive(Debug)]
pub struct CountingProvider {
    inner: LocalStorageProvider,
    pub checks: AtomicUsize,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
    pub created_dirs: Mutex<Vec<PathBuf>>,
}

impl CountingProvider {
    pub fn new(base: PathBuf) -> Self {
        Self {
            inner: LocalStorageProvider::new(base),
            checks: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            created_dirs: Mutex::new(Vec::new()),
        }
    }

    /// Directories created so far, in order, by either create call
    pub fn created_dirs(&self) -> Vec<PathBuf> {
        self.created_dirs.lock().expect("created dirs lock").clone()
    }

    /// Every operation that touched the filesystem so far
    pub fn io_count(&self) -> usize {
        self.checks.load(Ordering::SeqCst) + self.reads.load(Ordering::SeqCst) + self.writes.load(Ordering::SeqCst)
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl StorageProvider for CountingProvider {
    fn name(&self) -> &str {
        "counting"
    }

    fn exists(&self, path: &Path) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.inner.exists(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.inner.is_file(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.inner.is_dir(path)
    }

    fn create_dir(&self, path: &Path) -> StorageResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.created_dirs.lock().expect("created dirs lock").push(path.to_path_buf());
        self.inner.create_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> StorageResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.created_dirs.lock().expect("created dirs lock").push(path.to_path_buf());
        self.inner.create_dir_all(path)
    }

    fn read_to_string(&self, path: &Path) -> StorageResult<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_to_string(path)
    }

    fn write_string(&self, path: &Path, contents: &str) -> StorageResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write_string(path, contents)
    }
}

/// Records registry notifications
#[derive(Debug, Default)]
pub struct RecordingListener {
    pub events: Mutex<Vec<(String, InstanceId)>>,
}

impl RecordingListener {
    pub fn events(&self) -> Vec<(String, InstanceId)> {
        self.events.lock().expect("events lock").clone()
    }
}

impl InstanceSettingsListener for RecordingListener {
    fn notify_instance_settings_changed(&self, plugin_id: &str, instance_id: InstanceId) {
        self.events
            .lock()
            .expect("events lock")
            .push((plugin_id.to_string(), instance_id));
    }
}

/// A scripting engine that can be switched off
#[derive(Debug)]
pub struct RecordingEngine {
    pub active: AtomicBool,
    pub notified: Mutex<Vec<String>>,
}

impl RecordingEngine {
    pub fn new(active: bool) -> Self {
        Self {
            active: AtomicBool::new(active),
            notified: Mutex::new(Vec::new()),
        }
    }

    pub fn notified(&self) -> Vec<String> {
        self.notified.lock().expect("notified lock").clone()
    }
}

impl ScriptEngineObserver for RecordingEngine {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn notify_settings_changed(&self, plugin_id: &str) {
        self.notified.lock().expect("notified lock").push(plugin_id.to_string());
    }
}

/// A temporary install root and profile root holding one plugin
pub struct Fixture {
    pub dir: TempDir,
    pub install_path: PathBuf,
    pub profile_path: PathBuf,
    pub provider: Arc<CountingProvider>,
    pub listener: Arc<RecordingListener>,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempdir().expect("Failed to create temp directory");
        // The user data directory is always there; everything below it is created on save
        fs::create_dir(dir.path().join("userdata")).expect("create user data dir");
        let install_path = dir.path().join("plugins").join(PLUGIN_ID);
        let profile_path = dir.path().join("userdata").join("plugin_data").join(PLUGIN_ID);
        let provider = Arc::new(CountingProvider::new(dir.path().to_path_buf()));
        Self {
            dir,
            install_path,
            profile_path,
            provider,
            listener: Arc::new(RecordingListener::default()),
        }
    }

    /// Same as [`Fixture::new`] with `schema` installed
    pub fn with_schema(schema: &str) -> Self {
        let fixture = Self::new();
        fixture.write_schema(schema);
        fixture
    }

    pub fn write_schema(&self, schema: &str) {
        self.write_resource("settings.xml", schema);
    }

    pub fn write_resource(&self, name: &str, contents: &str) {
        let resources = self.install_path.join("resources");
        fs::create_dir_all(&resources).expect("create resources dir");
        fs::write(resources.join(name), contents).expect("write resource");
    }

    pub fn write_user_values(&self, file: &str, contents: &str) {
        fs::create_dir_all(&self.profile_path).expect("create profile dir");
        fs::write(self.profile_path.join(file), contents).expect("write user values");
    }

    pub fn read_user_values(&self, file: &str) -> String {
        fs::read_to_string(self.profile_path.join(file)).expect("read user values")
    }

    pub fn plugin(&self) -> TestPlugin {
        TestPlugin::new(PLUGIN_ID, self.install_path.clone(), self.profile_path.clone())
    }

    pub fn shared_plugin(&self) -> Arc<dyn Plugin> {
        Arc::new(self.plugin())
    }

    pub fn store_for(&self, plugin: &Arc<dyn Plugin>) -> SettingsStore {
        let provider: Arc<dyn StorageProvider> = self.provider.clone();
        let listener: Arc<dyn InstanceSettingsListener> = self.listener.clone();
        SettingsStore::new(
            plugin,
            SettingsLayout::default(),
            DocumentGateway::new(provider),
            ChangeNotifier::new(listener),
        )
    }
}
