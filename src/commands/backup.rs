use anyhow::{Context, Result};
use autoback::cli::Cli;
use autoback::config;
use autoback::paths::strip_quotes;
use autoback::{run_backup, BackupOptions, BackupOutcome, MaintenanceMode};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Merges command line flags over the config file and runs one backup.
pub async fn handle_backup(cli: &Cli) -> Result<()> {
    let config = config::load_config(cli.config.as_deref())
        .await
        .context("Failed to load configuration.")?;

    let options = BackupOptions {
        repo_path: cli.path.as_deref().map(unquote_path),
        guess_path: !cli.no_guess,
        message: cli.message.clone(),
        message_template: config.commit.message_template,
        tag: cli.tag.clone(),
        tag_message: cli.tag_message.clone(),
        archive: cli.archive.clone(),
        archive_format: cli.archive_format.or(config.archive.format),
        force_commit: cli.force,
        maintenance: cli.cleanup_mode()?.unwrap_or(config.maintenance.mode),
        quiet: cli.quiet,
    };

    if !cli.quiet {
        println!("{}", "Making auto backup...".bold());
    }
    let outcome = run_backup(&options).await.context("Backup failed.")?;
    if !cli.quiet {
        print_summary(&outcome);
    }

    Ok(())
}

fn print_summary(outcome: &BackupOutcome) {
    match &outcome.commit {
        Some(id) => println!(
            "🚀 Committed {} to {}: {}",
            short_id(id).cyan(),
            outcome.repo_root.display(),
            outcome.message
        ),
        None => println!(
            "{}",
            format!("No changes to commit in {}.", outcome.repo_root.display()).yellow()
        ),
    }
    if let Some(tag) = &outcome.tag {
        println!("🏷  Tagged as {}", tag.green());
    }
    if let Some(archive) = &outcome.archive {
        println!("📦 Archive written to {}", archive.display());
    }
    match outcome.maintenance {
        Some(MaintenanceMode::Auto) => println!("🧹 Maintenance checked (auto)"),
        Some(mode) => println!("🧹 Maintenance ran ({mode})"),
        None => {}
    }
}

/// Strips stray quotes; paths that are not valid UTF-8 are kept byte for byte.
fn unquote_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(strip_quotes(s)),
        None => path.to_path_buf(),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..7).unwrap_or(id)
}
