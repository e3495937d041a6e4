//! Info command implementation

use anyhow::Result;
use clap::{ArgMatches, Command};

pub fn command() -> Command {
    Command::new("info").about("Show tool information").arg(
        clap::Arg::new("detailed")
            .short('d')
            .long("detailed")
            .help("Show detailed information")
            .action(clap::ArgAction::SetTrue),
    )
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let detailed = matches.get_flag("detailed");

    println!("plugin-loader - Plugin discovery and loading");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));

    if detailed {
        println!("\nDetailed Information:");
        println!("  - Loading tiers: bootstrap, system, user (in that order)");
        println!("  - Packages are the immediate subdirectories of each root");
        println!("  - Entry modules are YAML documents named by the tier's convention");
        println!("  - Each module is imported once per process");
        println!("  - The first registration of a plugin id wins");
        println!("  - A failing plugin never stops the rest of the pass");
    }

    Ok(())
}
