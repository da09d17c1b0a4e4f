//! src/lib.rs
//!
//! Commit pending changes in a git repository, optionally tagging the commit,
//! exporting an archive of it and tidying up the object database. All the
//! actual work is done by the `git` executable.

pub mod backup;
pub mod cli;
pub mod config;
pub mod errors;
pub mod git;
pub mod paths;

pub use backup::{run_backup, ArchiveFormat, BackupOptions, BackupOutcome, MaintenanceMode};
pub use errors::BackupError;
pub use paths::deduce_repo_path;
