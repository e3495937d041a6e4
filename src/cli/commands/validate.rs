//! Validate command implementation

use crate::cli::utils;
use anyhow::Result;
use clap::{ArgMatches, Command};
use tracing::info;

use crate::plugin::PluginType;

pub fn command() -> Command {
    Command::new("validate")
        .about("Validate configuration file")
        .arg(utils::config_arg())
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    info!("Validating configuration file");

    let config = utils::load_config(matches)?;
    let classifier = config.classifier()?;

    println!("Configuration file is valid!");
    println!("Version: {}", config.version);
    println!("Fail on error: {}", config.fail_on_error);

    for plugin_type in PluginType::ALL {
        let strategy = classifier.strategy(plugin_type);
        println!(
            "  - {} (entry modules: {}; packages: {})",
            plugin_type,
            strategy.entry_modules.join(", "),
            strategy.package_pattern
        );
        for root in config.roots.for_type(plugin_type) {
            println!("      {}", root.display());
        }
    }

    Ok(())
}
