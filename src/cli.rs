//! src/cli.rs
use crate::backup::{ArchiveFormat, MaintenanceMode};
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

/// Commit, tag and archive whatever changed in a git repository.
#[derive(Parser, Debug)]
#[command(author, version, long_version = LONG_VERSION, about, long_about = None)]
#[command(group(ArgGroup::new("cleanup_choice").args(["cleanup", "force_compress", "no_compress", "aggressive"])))]
#[command(group(ArgGroup::new("loudness").args(["verbose", "quiet"])))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// The location of the git repository. Any path inside it works.
    #[arg(short, long, visible_alias = "repo", alias = "dest", short_aliases = ['r', 'd'])]
    pub path: Option<PathBuf>,

    /// Commit message. Defaults to the configured template, "Autosave on <date time>".
    #[arg(short, long, visible_alias = "commit-message", aliases = ["name", "body", "cm", "cn", "commit_message", "commit_name", "commit-name"], short_aliases = ['b', 'n'])]
    pub message: Option<String>,

    /// Tag the new commit with this name.
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Make the tag annotated with this message.
    #[arg(long, requires = "tag")]
    pub tag_message: Option<String>,

    /// Export the committed tree to this archive file.
    #[arg(short, long, value_name = "FILE")]
    pub archive: Option<PathBuf>,

    /// Archive format. Guessed from the file extension when omitted.
    #[arg(long, value_enum, requires = "archive")]
    pub archive_format: Option<ArchiveFormat>,

    /// Commit even if there are no changes.
    #[arg(short, long, alias = "forcecommit")]
    pub force: bool,

    /// Repository maintenance mode.
    #[arg(long, value_enum, value_name = "MODE")]
    pub cleanup: Option<MaintenanceMode>,

    /// Compress the database even if it is not quite necessary.
    #[arg(long = "force-compress", visible_alias = "fc", alias = "forcecompress")]
    pub force_compress: bool,

    /// Skip compressing the database even if it might be useful.
    #[arg(long = "no-compress", visible_alias = "fnc", alias = "forcenocompress")]
    pub no_compress: bool,

    /// Compress the database with `git gc --aggressive`.
    #[arg(long)]
    pub aggressive: bool,

    /// Read configuration from this file instead of the default location.
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Do not guess the repository location when --path is omitted.
    #[arg(long)]
    pub no_guess: bool,

    /// Print a verbose output of the process.
    #[arg(short, long)]
    pub verbose: bool,

    /// Avoid printing anything to the terminal if possible.
    #[arg(short, long)]
    pub quiet: bool,

    /// Print a link to the project page and exit.
    #[arg(long, visible_aliases = ["git", "github"])]
    pub link: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file.
    #[command(alias = "i")]
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("AUTOBACK_TARGET"), ")");

impl Cli {
    /// The cleanup mode picked on the command line, if any.
    pub fn cleanup_mode(&self) -> anyhow::Result<Option<MaintenanceMode>> {
        let from_flags =
            MaintenanceMode::from_flags(self.force_compress, self.no_compress, self.aggressive)?;
        Ok(self.cleanup.or(from_flags))
    }
}
