//! src/paths.rs
// Locating the repository to back up when none is given explicitly.

use crate::git;
use log::debug;
use std::env;
use std::path::{Path, PathBuf};

/// Strips one layer of surrounding quotes, which some shells and schedulers
/// leave on arguments.
pub fn strip_quotes(value: &str) -> &str {
    value.trim_matches('\'').trim_matches('"')
}

/// Expands a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

/// The nearest existing directory at or above `path`; a file yields its
/// parent. None when the path does not exist.
pub fn path_hunt_dir(path: &Path) -> Option<PathBuf> {
    let path = std::path::absolute(expand_home(path)).ok()?;
    if !path.exists() {
        return None;
    }
    path.ancestors()
        .find(|p| p.is_dir())
        .map(Path::to_path_buf)
}

/// Places a repository is looked for, in order: the working directory, the
/// directory of the invoked program and the directory of the installed
/// executable.
pub fn candidate_locations() -> Vec<PathBuf> {
    let cwd = env::current_dir().ok();
    let invoked = env::args_os().next().map(PathBuf::from);
    let installed = env::current_exe().ok();

    [cwd, invoked, installed]
        .into_iter()
        .flatten()
        .filter_map(|p| path_hunt_dir(&p))
        .collect()
}

/// Picks the first candidate inside a git work tree, or failing that the
/// first candidate at all.
pub async fn pick_location(candidates: Vec<PathBuf>) -> Option<PathBuf> {
    for candidate in &candidates {
        if git::is_repo(candidate).await {
            debug!("Deduced repository path {}", candidate.display());
            return Some(candidate.clone());
        }
    }
    candidates.into_iter().next()
}

pub async fn deduce_repo_path() -> Option<PathBuf> {
    pick_location(candidate_locations()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn quotes_are_stripped() {
        assert_eq!(strip_quotes("'my repo'"), "my repo");
        assert_eq!(strip_quotes("\"msg\""), "msg");
        assert_eq!(strip_quotes("plain"), "plain");
    }

    #[test]
    fn hunt_dir_walks_up_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, "x").unwrap();

        assert_eq!(path_hunt_dir(&file).as_deref(), Some(dir.path()));
        assert_eq!(path_hunt_dir(dir.path()).as_deref(), Some(dir.path()));
        assert_eq!(path_hunt_dir(&dir.path().join("missing")), None);
    }

    #[test]
    fn hunt_dir_resolves_bare_relative_names() {
        // cargo runs unit tests from the package root
        let cwd = env::current_dir().unwrap();
        assert_eq!(path_hunt_dir(Path::new("Cargo.toml")), Some(cwd));
    }

    #[test]
    fn home_is_expanded() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/backups")), home.join("backups"));
        }
        assert_eq!(expand_home(Path::new("/tmp/x")), PathBuf::from("/tmp/x"));
    }

    #[test]
    fn candidates_start_with_working_directory() {
        let candidates = candidate_locations();
        let cwd = env::current_dir().unwrap();
        assert_eq!(candidates.first(), Some(&cwd));
    }

    #[tokio::test]
    async fn pick_location_prefers_repositories() {
        let plain = tempfile::tempdir().unwrap();
        let repo = tempfile::tempdir().unwrap();
        let status = std::process::Command::new("git")
            .arg("init")
            .arg("--quiet")
            .current_dir(repo.path())
            .status()
            .unwrap();
        assert!(status.success());

        let picked = pick_location(vec![plain.path().to_path_buf(), repo.path().to_path_buf()]).await;
        assert_eq!(picked.as_deref(), Some(repo.path()));

        let other = tempfile::tempdir().unwrap();
        let picked = pick_location(vec![plain.path().to_path_buf(), other.path().to_path_buf()]).await;
        assert_eq!(picked.as_deref(), Some(plain.path()));

        assert_eq!(pick_location(Vec::new()).await, None);
    }
}
