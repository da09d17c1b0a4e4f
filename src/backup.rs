//! src/backup.rs

use crate::errors::BackupError;
use crate::git::{self, GitRepo};
use crate::paths;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::ValueEnum;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_MESSAGE_TEMPLATE: &str = "Autosave on {datetime}";

// --- Data Structures ---

/// How the object database is tidied up after the commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceMode {
    /// Let git decide (`git gc --auto`).
    #[default]
    #[serde(alias = "none")]
    #[value(alias = "none")]
    Auto,
    /// Always compress the database.
    Always,
    /// Never run maintenance.
    Never,
    /// Compress with `--aggressive`.
    Aggressive,
}

impl MaintenanceMode {
    /// Builds a mode from the individual cleanup switches. At most one may be
    /// set; none set means no explicit choice.
    pub fn from_flags(always: bool, never: bool, aggressive: bool) -> Result<Option<Self>> {
        let chosen: Vec<Self> = [
            (always, Self::Always),
            (never, Self::Never),
            (aggressive, Self::Aggressive),
        ]
        .into_iter()
        .filter_map(|(set, mode)| set.then_some(mode))
        .collect();

        match chosen.as_slice() {
            [] => Ok(None),
            [mode] => Ok(Some(*mode)),
            many => {
                let names: Vec<String> = many.iter().map(ToString::to_string).collect();
                Err(BackupError::ConflictingCleanup(names.join(", ")).into())
            }
        }
    }
}

impl fmt::Display for MaintenanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Always => "always",
            Self::Never => "never",
            Self::Aggressive => "aggressive",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    Tar,
    #[serde(rename = "tar.gz", alias = "tgz")]
    #[value(name = "tar.gz", alias = "tgz")]
    TarGz,
    Zip,
}

impl ArchiveFormat {
    /// Guesses the format from the destination's file name; unknown
    /// extensions fall back to tar, as `git archive` does.
    pub fn infer(dest: &Path) -> Self {
        let name = dest
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if name.ends_with(".zip") {
            Self::Zip
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Self::TarGz
        } else {
            Self::Tar
        }
    }

    /// The name `git archive --format` expects.
    pub fn git_name(&self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::TarGz => "tgz",
            Self::Zip => "zip",
        }
    }
}

/// Everything one backup run needs to know.
#[derive(Debug, Clone)]
pub struct BackupOptions {
    pub repo_path: Option<PathBuf>,
    /// Deduce the repository when `repo_path` is None.
    pub guess_path: bool,
    pub message: Option<String>,
    pub message_template: String,
    pub tag: Option<String>,
    pub tag_message: Option<String>,
    pub archive: Option<PathBuf>,
    pub archive_format: Option<ArchiveFormat>,
    pub force_commit: bool,
    pub maintenance: MaintenanceMode,
    /// Pass `--quiet` to the maintenance step.
    pub quiet: bool,
}

impl Default for BackupOptions {
    fn default() -> Self {
        Self {
            repo_path: None,
            guess_path: false,
            message: None,
            message_template: DEFAULT_MESSAGE_TEMPLATE.to_string(),
            tag: None,
            tag_message: None,
            archive: None,
            archive_format: None,
            force_commit: false,
            maintenance: MaintenanceMode::Auto,
            quiet: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackupOutcome {
    pub repo_root: PathBuf,
    pub message: String,
    /// Id of the commit that was made, if any.
    pub commit: Option<String>,
    pub tag: Option<String>,
    pub archive: Option<PathBuf>,
    /// Mode of the maintenance step that ran; None when it was skipped.
    pub maintenance: Option<MaintenanceMode>,
}

impl BackupOutcome {
    pub fn made_backup(&self) -> bool {
        self.commit.is_some()
    }
}

// --- Public API ---

/// Fills `{datetime}`, `{date}` and `{time}` in a message template.
pub fn render_message(template: &str, now: DateTime<Local>) -> String {
    template
        .replace("{datetime}", &now.format("%Y-%m-%d %H:%M:%S").to_string())
        .replace("{date}", &now.format("%Y-%m-%d").to_string())
        .replace("{time}", &now.format("%H:%M:%S").to_string())
}

/// The message a commit will carry: the supplied one when it has content,
/// the rendered template otherwise.
pub fn resolve_message(message: Option<&str>, template: &str) -> String {
    match message.map(paths::strip_quotes).map(str::trim) {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => {
            let rendered = render_message(template, Local::now());
            if rendered.trim().is_empty() {
                render_message(DEFAULT_MESSAGE_TEMPLATE, Local::now())
            } else {
                rendered
            }
        }
    }
}

/// Commits pending changes, then tags, archives and tidies the repository as
/// requested. A clean repository without `force_commit` is not an error: the
/// outcome simply reports that no commit was made.
pub async fn run_backup(options: &BackupOptions) -> Result<BackupOutcome> {
    git::ensure_git_available()?;

    let repo_path = match &options.repo_path {
        Some(path) => paths::expand_home(path),
        None if options.guess_path => paths::deduce_repo_path()
            .await
            .ok_or(BackupError::NoRepositoryPath)?,
        None => return Err(BackupError::NoRepositoryPath.into()),
    };

    let repo = GitRepo::open(&repo_path).await?;
    info!(
        "Opening {} at {}{}",
        repo.name(),
        repo.root().display(),
        if options.force_commit { " and forcing a commit" } else { "" }
    );

    if let Some(tag) = &options.tag {
        repo.check_tag_name(tag).await?;
        if repo.tag_exists(tag).await? {
            return Err(BackupError::TagExists(tag.clone()).into());
        }
    }
    if let Some(dest) = &options.archive {
        warn_if_inside(repo.root(), dest);
    }

    let message = resolve_message(options.message.as_deref(), &options.message_template);
    let commit = commit_changes(&repo, &message, options.force_commit).await?;

    let tag = match (&options.tag, &commit) {
        (Some(tag), Some(_)) => {
            repo.create_tag(tag, options.tag_message.as_deref())
                .await
                .with_context(|| format!("Failed to create tag {tag}"))?;
            info!("Tagged HEAD as {tag}");
            Some(tag.clone())
        }
        (Some(tag), None) => {
            info!("Nothing was committed, not creating tag {tag}");
            None
        }
        (None, _) => None,
    };

    let archive = match &options.archive {
        Some(dest) => {
            let format = options
                .archive_format
                .unwrap_or_else(|| ArchiveFormat::infer(dest));
            let written = repo
                .archive(dest, format)
                .await
                .context("Failed to export archive")?;
            info!("Exported HEAD to {}", written.display());
            Some(written)
        }
        None => None,
    };

    let maintenance_output = repo
        .maintenance(options.maintenance, options.quiet)
        .await
        .context("Failed to run repository maintenance")?;
    let maintenance = maintenance_output.map(|out| {
        log_output(&out);
        options.maintenance
    });

    Ok(BackupOutcome {
        repo_root: repo.root().to_path_buf(),
        message,
        commit,
        tag,
        archive,
        maintenance,
    })
}

// --- Helper Functions ---

async fn commit_changes(repo: &GitRepo, message: &str, force: bool) -> Result<Option<String>> {
    if !force && !repo.is_dirty().await? {
        info!("No changes in {}, nothing to commit", repo.name());
        return Ok(None);
    }

    let added = repo.add_all().await.context("Failed to stage changes")?;
    log_output(&added);
    log_output(&repo.short_status().await?);

    if !force && !repo.has_staged_changes().await? {
        warn!("Work tree is dirty but nothing could be staged, skipping commit");
        return Ok(None);
    }

    let out = repo
        .commit(message, force)
        .await
        .context("Failed to commit changes")?;
    log_output(&out);

    Ok(Some(repo.head_commit().await?))
}

fn warn_if_inside(root: &Path, dest: &Path) {
    if let Ok(dest) = std::path::absolute(dest) {
        if dest.starts_with(root) {
            warn!(
                "Archive {} is inside the work tree and will show up as a change next run",
                dest.display()
            );
        }
    }
}

fn log_output(out: &str) {
    let out = out.trim();
    if !out.is_empty() {
        debug!("{out}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn conflicting_cleanup_flags_are_rejected() {
        let err = MaintenanceMode::from_flags(true, true, false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BackupError>(),
            Some(BackupError::ConflictingCleanup(_))
        ));
        assert!(MaintenanceMode::from_flags(false, true, true).is_err());
    }

    #[test]
    fn single_cleanup_flag_picks_mode() {
        assert_eq!(MaintenanceMode::from_flags(false, false, false).unwrap(), None);
        assert_eq!(
            MaintenanceMode::from_flags(false, false, true).unwrap(),
            Some(MaintenanceMode::Aggressive)
        );
        assert_eq!(
            MaintenanceMode::from_flags(false, true, false).unwrap(),
            Some(MaintenanceMode::Never)
        );
    }

    #[test]
    fn maintenance_mode_accepts_none_spelling() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: MaintenanceMode,
        }
        let parsed: Wrapper = toml::from_str(r#"mode = "none""#).unwrap();
        assert_eq!(parsed.mode, MaintenanceMode::Auto);
        assert_eq!(
            MaintenanceMode::from_str("none", true).unwrap(),
            MaintenanceMode::Auto
        );
    }

    #[test]
    fn archive_format_follows_extension() {
        assert_eq!(ArchiveFormat::infer(Path::new("out/snap.zip")), ArchiveFormat::Zip);
        assert_eq!(ArchiveFormat::infer(Path::new("snap.TAR.GZ")), ArchiveFormat::TarGz);
        assert_eq!(ArchiveFormat::infer(Path::new("snap.tgz")), ArchiveFormat::TarGz);
        assert_eq!(ArchiveFormat::infer(Path::new("snap.tar")), ArchiveFormat::Tar);
        assert_eq!(ArchiveFormat::infer(Path::new("snapshot")), ArchiveFormat::Tar);
    }

    #[test]
    fn message_template_is_rendered() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            render_message(DEFAULT_MESSAGE_TEMPLATE, now),
            "Autosave on 2024-03-09 14:05:07"
        );
        assert_eq!(render_message("backup {date} at {time}", now), "backup 2024-03-09 at 14:05:07");
    }

    #[test]
    fn blank_message_falls_back_to_template() {
        assert!(resolve_message(None, DEFAULT_MESSAGE_TEMPLATE).starts_with("Autosave on "));
        assert!(resolve_message(Some("   "), DEFAULT_MESSAGE_TEMPLATE).starts_with("Autosave on "));
        assert!(resolve_message(Some(""), "").starts_with("Autosave on "));
        assert_eq!(resolve_message(Some("'nightly'"), DEFAULT_MESSAGE_TEMPLATE), "nightly");
    }
}
