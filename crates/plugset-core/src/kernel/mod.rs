//! # Plugset Core Kernel
//!
//! The `kernel` module holds the pieces every other subsystem leans on.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Component Lifecycle**: long-lived services such as the
//!   [`SettingsManager`](crate::settings::SettingsManager) implement the
//!   [`KernelComponent`](component::KernelComponent) trait.
//! - **Configuration**: [`EngineConfig`](config::EngineConfig) describes where plugins
//!   are installed, where profiles live and how settings files are named.
//! - **Core Constants**: file and directory names via the `constants` submodule.
//! - **Error Handling**: the aggregate [`Error`](error::Error) and its `Result` alias.
pub mod component;
pub mod config;
pub mod constants;
pub mod error;

pub use component::KernelComponent;
pub use config::{EngineConfig, SettingsLayout};
pub use error::{Error, Result};
