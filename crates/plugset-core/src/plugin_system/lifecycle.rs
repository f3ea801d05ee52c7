//! Install and uninstall hooks.
//!
//! The package installer calls these around installing and removing a
//! plugin; each one forwards to the matching [`Plugin`] hook.
use std::sync::Arc;

use log::debug;

use crate::plugin_system::traits::Plugin;

pub fn on_pre_install(plugin: &Arc<dyn Plugin>) {
    debug!("[{}] pre-install", plugin.id());
    plugin.on_pre_install();
}

pub fn on_post_install(plugin: &Arc<dyn Plugin>, update: bool, modal: bool) {
    debug!("[{}] post-install (update: {}, modal: {})", plugin.id(), update, modal);
    plugin.on_post_install(update, modal);
}

pub fn on_pre_uninstall(plugin: &Arc<dyn Plugin>) {
    debug!("[{}] pre-uninstall", plugin.id());
    plugin.on_pre_uninstall();
}

pub fn on_post_uninstall(plugin: &Arc<dyn Plugin>) {
    debug!("[{}] post-uninstall", plugin.id());
    plugin.on_post_uninstall();
}
