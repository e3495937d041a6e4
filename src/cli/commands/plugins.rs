//! Plugin registry CLI commands

use crate::cli::utils;
use crate::PluginHost;
use anyhow::Result;
use clap::ArgMatches;

use crate::plugin::{PluginType, RegistryEntry};

/// Create the plugins command
pub fn command() -> clap::Command {
    clap::Command::new("plugins")
        .about("Inspect loaded plugins")
        .subcommand_negates_reqs(true)
        .subcommand(
            clap::Command::new("list")
                .about("Load plugins and list the registry")
                .arg(utils::config_arg())
                .arg(
                    clap::Arg::new("type")
                        .short('t')
                        .long("type")
                        .help("Only list plugins of this type")
                        .value_name("TYPE")
                        .value_parser(clap::value_parser!(PluginType)),
                )
                .arg(
                    clap::Arg::new("detailed")
                        .short('d')
                        .long("detailed")
                        .help("Show detailed information")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    clap::Arg::new("json")
                        .long("json")
                        .help("Print the registry as JSON")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            clap::Command::new("info")
                .about("Show plugin information")
                .arg(utils::config_arg())
                .arg(clap::arg!(<PLUGIN_ID> "Plugin ID")),
        )
}

/// Run plugin command
pub async fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("list", sub_matches)) => run_list(sub_matches).await,
        Some(("info", sub_matches)) => run_info(sub_matches).await,
        _ => {
            let _ = command().print_help();
            Ok(())
        }
    }
}

async fn run_list(matches: &ArgMatches) -> Result<()> {
    let host = create_host(matches).await?;
    let mut plugins = host.get_plugin_info().await;

    if let Some(plugin_type) = matches.get_one::<PluginType>("type") {
        plugins.retain(|plugin| plugin.plugin_type == *plugin_type);
    }

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&plugins)?);
        return Ok(());
    }

    if plugins.is_empty() {
        println!("No plugins found.");
        return Ok(());
    }

    println!("Loaded plugins:");
    println!();

    let detailed = matches.get_flag("detailed");
    for plugin in &plugins {
        println!("  {} [{}]", plugin.descriptor.name, plugin.plugin_type);
        println!("    ID: {}", plugin.id());
        println!("    Module: {}", plugin.module);

        if detailed {
            print_details(plugin);
        }

        println!();
    }

    Ok(())
}

async fn run_info(matches: &ArgMatches) -> Result<()> {
    let host = create_host(matches).await?;
    let plugin_id = matches
        .get_one::<String>("PLUGIN_ID")
        .cloned()
        .unwrap_or_default();

    match host.registry().get(&plugin_id).await {
        Some(plugin) => {
            println!("Plugin Information:");
            println!("  Name: {}", plugin.descriptor.name);
            println!("  ID: {}", plugin.id());
            println!("  Type: {}", plugin.plugin_type);
            println!("  Module: {}", plugin.module);
            print_details(&plugin);
        }
        None => println!("Plugin '{plugin_id}' not found."),
    }

    Ok(())
}

fn print_details(plugin: &RegistryEntry) {
    if !plugin.descriptor.description.is_empty() {
        println!("    Description: {}", plugin.descriptor.description);
    }
    println!("    Origin: {}", plugin.origin.display());
    println!("    Registered at: {}", plugin.registered_at.to_rfc3339());
    if !plugin.descriptor.capabilities.is_empty() {
        println!("    Capabilities:");
        for capability in &plugin.descriptor.capabilities {
            println!("      - {capability}");
        }
    }
}

/// Create a host and run a full load pass
async fn create_host(matches: &ArgMatches) -> Result<PluginHost> {
    let config = utils::load_config_or_default(matches)?;
    let host = utils::create_host(config)?;
    host.initialize_plugins().await?;
    Ok(host)
}
