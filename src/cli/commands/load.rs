//! Load command implementation

use crate::cli::utils;
use anyhow::{anyhow, Result};
use clap::{ArgMatches, Command};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use crate::plugin::{LoadReport, PluginType};
use crate::PluginLoaderError;

pub fn command() -> Command {
    Command::new("load")
        .about("Discover and load plugins")
        .arg(utils::config_arg())
        .arg(
            clap::Arg::new("type")
                .short('t')
                .long("type")
                .help("Load a single plugin type (bootstrap, system, user)")
                .value_name("TYPE")
                .value_parser(clap::value_parser!(PluginType)),
        )
        .arg(
            clap::Arg::new("root")
                .short('r')
                .long("root")
                .help("Plugin root to scan instead of the configured ones (requires --type)")
                .value_name("DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .action(clap::ArgAction::Append),
        )
        .arg(
            clap::Arg::new("fail_on_error")
                .long("fail-on-error")
                .help("Exit with an error if any plugin failed to load")
                .action(clap::ArgAction::SetTrue),
        )
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let mut config = utils::load_config_or_default(matches)?;
    if matches.get_flag("fail_on_error") {
        config.fail_on_error = true;
    }

    let plugin_type = matches.get_one::<PluginType>("type").copied();
    let roots: Vec<PathBuf> = matches
        .get_many::<PathBuf>("root")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let host = utils::create_host(config)?;
    let start_time = Instant::now();

    let reports = match plugin_type {
        Some(plugin_type) => {
            let roots = if roots.is_empty() {
                host.config().roots.for_type(plugin_type).to_vec()
            } else {
                roots
            };
            vec![host.load(plugin_type, &roots).await?]
        }
        None if !roots.is_empty() => {
            return Err(anyhow!("--root requires --type"));
        }
        None => host.initialize_plugins().await?,
    };

    info!(
        "Load completed in {}",
        crate::utils::format_duration(start_time.elapsed())
    );

    for report in &reports {
        print_report(report);
    }

    if host.should_fail(&reports) {
        let failures = reports.iter().map(|r| r.failures.len()).sum();
        return Err(PluginLoaderError::LoadFailed(failures).into());
    }

    Ok(())
}

/// Print a load report
pub fn print_report(report: &LoadReport) {
    println!("{} plugins:", report.plugin_type);
    println!("  Roots scanned: {}", report.scanned_roots.len());
    for root in &report.skipped_roots {
        println!("  Skipped root: {}", root.display());
    }
    println!(
        "  Packages: {} ({} without a {} entry module)",
        report.candidates, report.unmatched, report.plugin_type
    );
    println!("  Registered: {}", report.registered.len());
    for id in &report.registered {
        println!("    + {id}");
    }
    if !report.duplicates.is_empty() {
        println!("  Already registered: {}", report.duplicates.join(", "));
    }
    if !report.failures.is_empty() {
        println!("  Failures: {}", report.failures.len());
        for failure in &report.failures {
            println!(
                "    ! {} ({:?}): {}",
                failure.module.as_deref().unwrap_or("-"),
                failure.stage,
                failure.message
            );
        }
    }
    println!();
}
