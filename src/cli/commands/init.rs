//! Init command implementation

use crate::Config;
use anyhow::Result;
use clap::{ArgMatches, Command};
use std::path::PathBuf;
use tracing::info;

use crate::plugin::{DiscoveryStrategy, PluginType};
use crate::utils;

pub fn command() -> Command {
    Command::new("init")
        .about("Initialize a new configuration file")
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("Output file path")
                .value_name("FILE")
                .default_value(".plugin-loader.yaml"),
        )
        .arg(
            clap::Arg::new("example")
                .short('e')
                .long("example")
                .help("Spell out the built-in naming conventions")
                .action(clap::ArgAction::SetTrue),
        )
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let output_path = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".plugin-loader.yaml"));
    let example = matches.get_flag("example");

    info!("Initializing configuration file: {:?}", output_path);

    let config = if example {
        create_example_config()
    } else {
        Config::default()
    };

    utils::ensure_parent_directory(&output_path)?;
    config.save_to_file(&output_path)?;

    info!("Configuration file created: {:?}", output_path);

    if example {
        println!("Configuration created with the built-in naming conventions spelled out.");
        println!("Edit the strategies to change which entry modules are loaded.");
    } else {
        println!("Configuration file created with the default plugin roots.");
    }

    Ok(())
}

fn create_example_config() -> Config {
    let mut config = Config::default();

    for plugin_type in PluginType::ALL {
        config
            .strategies
            .insert(plugin_type, DiscoveryStrategy::for_type(plugin_type));
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_is_valid() {
        let config = create_example_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.strategies.len(), PluginType::ALL.len());
    }
}
