//! src/main.rs

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

mod commands;

use autoback::cli::{Cli, Commands};
use commands::{backup::handle_backup, init::handle_init};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(&cli);

    if cli.link {
        println!("{}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    match cli.command {
        Some(Commands::Init { force }) => handle_init(cli.config.clone(), force).await?,
        None => handle_backup(&cli).await?,
    }

    Ok(())
}

/// `--verbose` shows every git invocation, `--quiet` only errors.
/// `AUTOBACK_LOG` takes env_logger filter syntax and wins over both.
fn init_logger(cli: &Cli) {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Warn
    };

    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("AUTOBACK_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}
