//! Core constants for the settings engine

/// Application name
pub const APP_NAME: &str = "plugset";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the user-values file inside a plugin's profile directory
pub const USER_SETTINGS_FILE: &str = "settings.xml";

/// Prefix of per-instance user-values files (`instance-settings-<id>.xml`)
pub const INSTANCE_SETTINGS_PREFIX: &str = "instance-settings";

/// Directory inside a plugin's install directory holding its resources
pub const RESOURCES_DIR: &str = "resources";

/// Schema file name inside the resources directory
pub const SCHEMA_FILE: &str = "settings.xml";

/// Schema used for additional instances, when the plugin ships one
pub const INSTANCE_SCHEMA_FILE: &str = "instance-settings.xml";

/// Root element name of every settings document
pub const SETTINGS_ROOT: &str = "settings";

/// Element name of a single setting (definition or value)
pub const SETTING_ELEMENT: &str = "setting";

/// Version attribute written to user-values files
pub const VALUES_FORMAT_VERSION: &str = "2";

/// Default directory holding installed plugins
pub const DEFAULT_INSTALL_ROOT: &str = "plugins";

/// Default directory holding per-plugin profile data
pub const DEFAULT_PROFILE_ROOT: &str = "userdata/plugin_data";
