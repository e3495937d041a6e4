//! CLI command implementations

use anyhow::Result;
use clap::{ArgMatches, Command};

pub mod commands;

/// Main CLI application
pub struct CliApp;

impl CliApp {
    /// Create the CLI application
    pub fn app() -> Command {
        Command::new("plugin-loader")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Discover, import and register plugins from plugin roots")
            .subcommand_negates_reqs(true)
            .subcommand(commands::init::command())
            .subcommand(commands::validate::command())
            .subcommand(commands::load::command())
            .subcommand(commands::plugins::command())
            .subcommand(commands::info::command())
    }

    /// Run the CLI application
    pub async fn run(matches: &ArgMatches) -> Result<()> {
        match matches.subcommand() {
            Some(("init", sub_matches)) => commands::init::run(sub_matches).await,
            Some(("validate", sub_matches)) => commands::validate::run(sub_matches).await,
            Some(("load", sub_matches)) => commands::load::run(sub_matches).await,
            Some(("plugins", sub_matches)) => commands::plugins::run(sub_matches).await,
            Some(("info", sub_matches)) => commands::info::run(sub_matches).await,
            _ => {
                // No subcommand provided, show help
                let _ = Self::app().print_help();
                Ok(())
            }
        }
    }
}

/// Common CLI utilities
pub mod utils {
    use anyhow::Result;
    use std::path::PathBuf;

    use crate::{PluginLoaderError, PluginLoaderResult};

    /// Default configuration file locations, in lookup order
    pub const DEFAULT_CONFIG_PATHS: [&str; 4] = [
        ".plugin-loader.yaml",
        ".plugin-loader.yml",
        "plugin-loader.yaml",
        "plugin-loader.yml",
    ];

    /// Configuration file option shared by commands
    pub fn config_arg() -> clap::Arg {
        clap::Arg::new("config")
            .short('c')
            .long("config")
            .help("Configuration file path")
            .value_name("FILE")
    }

    /// Get configuration file path from arguments or use default
    pub fn get_config_path(matches: &clap::ArgMatches) -> PluginLoaderResult<PathBuf> {
        if let Some(config_path) = matches.get_one::<String>("config") {
            return Ok(PathBuf::from(config_path));
        }

        DEFAULT_CONFIG_PATHS
            .into_iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
            .ok_or_else(|| {
                PluginLoaderError::Config(
                    "No configuration file found. Use --config to specify a file or create one with 'plugin-loader init'".to_string(),
                )
            })
    }

    /// Load configuration from file
    pub fn load_config(matches: &clap::ArgMatches) -> Result<crate::Config> {
        let config_path = get_config_path(matches)?;
        crate::Config::from_file(&config_path)
    }

    /// Load configuration from file, falling back to the defaults when none exists
    pub fn load_config_or_default(matches: &clap::ArgMatches) -> Result<crate::Config> {
        match get_config_path(matches) {
            Ok(path) => crate::Config::from_file(&path),
            Err(_) => Ok(crate::Config::default()),
        }
    }

    /// Create a host registering into the process-wide registry
    pub fn create_host(config: crate::Config) -> Result<crate::PluginHost> {
        crate::PluginHost::new(config)
    }
}
