//! src/git.rs

use crate::backup::{ArchiveFormat, MaintenanceMode};
use crate::errors::BackupError;
use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::fs;
use tokio::process::Command;

// --- Public API ---

/// Fails with [`BackupError::GitNotFound`] unless a `git` executable is on PATH.
pub fn ensure_git_available() -> Result<()> {
    which::which("git").map_err(|_| BackupError::GitNotFound)?;
    Ok(())
}

/// Runs `git` inside `dir` and returns its stdout, or a [`BackupError::Git`]
/// when the command exits unsuccessfully.
pub async fn run_git_command(dir: &Path, args: &[&str]) -> Result<String> {
    let output = spawn_git(dir, args).await?;

    if output.status.success() {
        Ok(String::from_utf8(output.stdout).context("Failed to parse git command output")?)
    } else {
        let stderr =
            String::from_utf8(output.stderr).unwrap_or_else(|_| "Could not read stderr".to_string());
        Err(BackupError::Git {
            command: args.join(" "),
            status: output.status,
            stderr: stderr.trim_end().to_string(),
        }
        .into())
    }
}

/// Runs `git` inside `dir` and only reports whether it exited successfully.
pub async fn git_succeeds(dir: &Path, args: &[&str]) -> Result<bool> {
    Ok(spawn_git(dir, args).await?.status.success())
}

/// Boolean counterpart of [`GitRepo::open`]; bare repositories do not count.
pub async fn is_repo(path: &Path) -> bool {
    GitRepo::open(path).await.is_ok()
}

/// A non-bare git work tree, addressed by its top-level directory.
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    /// Opens the work tree containing `path`. Any file or directory inside the
    /// repository is accepted; git walks up to the top level itself.
    pub async fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BackupError::PathNotFound(path.to_path_buf()).into());
        }
        // A bare file name has an empty parent, which cannot be a working directory.
        let absolute = std::path::absolute(path)
            .with_context(|| format!("Failed to resolve {}", path.display()))?;
        let dir = if absolute.is_dir() {
            absolute.as_path()
        } else {
            absolute.parent().unwrap_or(&absolute)
        };

        let is_bare = match run_git_command(dir, &["rev-parse", "--is-bare-repository"]).await {
            Ok(out) => out.trim() == "true",
            Err(_) => return Err(BackupError::NotARepository(path.to_path_buf()).into()),
        };
        if is_bare {
            return Err(BackupError::BareRepository(path.to_path_buf()).into());
        }

        // Inside `.git` itself there is no work tree to back up.
        let toplevel = run_git_command(dir, &["rev-parse", "--show-toplevel"])
            .await
            .map_err(|_| BackupError::NotARepository(path.to_path_buf()))?;

        Ok(Self {
            root: PathBuf::from(toplevel.trim()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory name of the work tree, used in log lines.
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_project")
            .to_string()
    }

    pub async fn run(&self, args: &[&str]) -> Result<String> {
        run_git_command(&self.root, args).await
    }

    /// True when anything differs from HEAD, untracked files included.
    pub async fn is_dirty(&self) -> Result<bool> {
        let status = self
            .run(&["status", "--porcelain", "--untracked-files=all"])
            .await?;
        Ok(!status.trim().is_empty())
    }

    pub async fn add_all(&self) -> Result<String> {
        self.run(&["add", "--all", "--ignore-errors"]).await
    }

    pub async fn short_status(&self) -> Result<String> {
        self.run(&["status", "--short"]).await
    }

    /// `git diff --cached --quiet` exits 1 when the index differs from HEAD.
    pub async fn has_staged_changes(&self) -> Result<bool> {
        Ok(!git_succeeds(&self.root, &["diff", "--cached", "--quiet"]).await?)
    }

    pub async fn commit(&self, message: &str, allow_empty: bool) -> Result<String> {
        let mut args = vec!["commit"];
        if allow_empty {
            args.push("--allow-empty");
        }
        args.extend(["-m", message]);
        self.run(&args).await
    }

    pub async fn head_commit(&self) -> Result<String> {
        Ok(self.run(&["rev-parse", "HEAD"]).await?.trim().to_string())
    }

    pub async fn check_tag_name(&self, name: &str) -> Result<()> {
        let reference = format!("refs/tags/{name}");
        // A leading dash would be read as an option by `git tag`.
        if name.trim().is_empty()
            || name.starts_with('-')
            || !git_succeeds(&self.root, &["check-ref-format", &reference]).await?
        {
            return Err(BackupError::InvalidTagName(name.to_string()).into());
        }
        Ok(())
    }

    pub async fn tag_exists(&self, name: &str) -> Result<bool> {
        let reference = format!("refs/tags/{name}");
        git_succeeds(&self.root, &["rev-parse", "--verify", "--quiet", &reference]).await
    }

    /// Tags HEAD. A message makes the tag annotated, otherwise it is lightweight.
    pub async fn create_tag(&self, name: &str, message: Option<&str>) -> Result<String> {
        match message {
            Some(message) => self.run(&["tag", "-a", name, "-m", message]).await,
            None => self.run(&["tag", name]).await,
        }
    }

    /// Writes `HEAD` to `dest`. Relative destinations are taken relative to
    /// the process working directory, not the repository.
    pub async fn archive(&self, dest: &Path, format: ArchiveFormat) -> Result<PathBuf> {
        let dest = std::path::absolute(dest)
            .with_context(|| format!("Failed to resolve archive path {}", dest.display()))?;
        if let Some(parent) = dest.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create archive directory")?;
            }
        }

        let format_arg = format!("--format={}", format.git_name());
        let dest_str = dest.to_string_lossy().into_owned();
        self.run(&["archive", &format_arg, "-o", &dest_str, "HEAD"])
            .await?;
        Ok(dest)
    }

    /// Runs `git gc` as the mode asks. Returns None when maintenance is skipped.
    pub async fn maintenance(&self, mode: MaintenanceMode, quiet: bool) -> Result<Option<String>> {
        let mut args = vec!["gc"];
        match mode {
            MaintenanceMode::Never => return Ok(None),
            MaintenanceMode::Auto => args.push("--auto"),
            MaintenanceMode::Always => {}
            MaintenanceMode::Aggressive => args.push("--aggressive"),
        }
        if quiet {
            args.push("--quiet");
        }
        self.run(&args).await.map(Some)
    }
}

// --- Helper Functions ---

async fn spawn_git(dir: &Path, args: &[&str]) -> Result<Output> {
    debug!("git {} (in {})", args.join(" "), dir.display());
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .context("Failed to execute git command")
}
