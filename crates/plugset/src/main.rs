mod cli;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgAction, Parser, Subcommand};
use log::{debug, info};

use plugset_core::kernel::KernelComponent;
use plugset_core::settings::InstanceId;
use plugset_core::{
    EngineConfig, Error, LocalStorageProvider, OWN_SETTINGS_ID, PluginInfo, PluginRegistry, SettingsManager,
    StorageProvider,
};

/// Plugset: inspect and edit the settings of installed plugins
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Engine configuration file (.json, .yaml or .toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding one subdirectory per installed plugin
    #[arg(long, value_name = "DIR")]
    install_root: Option<PathBuf>,

    /// Directory holding one profile subdirectory per plugin
    #[arg(long, value_name = "DIR")]
    profile_root: Option<PathBuf>,

    /// More log output (-v, -vv, -vvv); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every setting of a plugin with its current value
    List {
        /// Plugin id
        plugin: String,
        /// Settings instance (0 is the plugin's own settings)
        #[arg(long, default_value_t = OWN_SETTINGS_ID)]
        instance: InstanceId,
    },
    /// Print the current value of one setting
    Get {
        plugin: String,
        key: String,
        #[arg(long, default_value_t = OWN_SETTINGS_ID)]
        instance: InstanceId,
    },
    /// Change one setting and save it
    Set {
        plugin: String,
        key: String,
        value: String,
        #[arg(long, default_value_t = OWN_SETTINGS_ID)]
        instance: InstanceId,
    },
    /// Return every setting to its default and save
    Defaults {
        plugin: String,
        #[arg(long, default_value_t = OWN_SETTINGS_ID)]
        instance: InstanceId,
    },
}

impl Commands {
    fn plugin(&self) -> &str {
        match self {
            Commands::List { plugin, .. }
            | Commands::Get { plugin, .. }
            | Commands::Set { plugin, .. }
            | Commands::Defaults { plugin, .. } => plugin,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    if let Err(e) = builder.format_timestamp(None).try_init() {
        eprintln!("Failed to initialize env_logger: {}", e);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> Result<(), Error> {
    let provider: Arc<dyn StorageProvider> = Arc::new(LocalStorageProvider::current_dir());

    let mut config = match &args.config {
        Some(path) => {
            debug!("Loading engine configuration from {}", path.display());
            EngineConfig::load(provider.as_ref(), path)?
        }
        None => EngineConfig::default(),
    };
    if let Some(root) = args.install_root {
        config.install_root = root;
    }
    if let Some(root) = args.profile_root {
        config.profile_root = root;
    }
    info!(
        "Plugins in {}, profiles in {}",
        config.install_root.display(),
        config.profile_root.display()
    );

    let registry = Arc::new(PluginRegistry::new());
    let manager = SettingsManager::new(config, provider, registry.clone());
    manager.initialize().await?;
    manager.start().await?;

    let plugin_id = args.command.plugin().to_string();
    registry.register(Arc::new(PluginInfo::from_config(manager.config(), &plugin_id)))?;
    let result = cli::execute(&manager, &plugin_id, args.command);

    manager.stop().await?;
    result
}
