//! src/errors.rs

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Failures a backup run can end with.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("git executable was not found in PATH")]
    GitNotFound,

    #[error("no repository path was given and none could be deduced")]
    NoRepositoryPath,

    #[error("path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("refusing to back up a bare repository: {}", .0.display())]
    BareRepository(PathBuf),

    #[error("conflicting cleanup options: {0}")]
    ConflictingCleanup(String),

    #[error("invalid tag name: {0}")]
    InvalidTagName(String),

    #[error("tag already exists: {0}")]
    TagExists(String),

    #[error("`git {command}` failed with {status}:\n{stderr}")]
    Git {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
}
