// tests/common/mod.rs

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::{tempdir, TempDir};

// --- Test Setup Helper ---

pub struct TestRepo {
    temp_dir: TempDir,
}

impl TestRepo {
    /// An empty directory that is not a repository.
    pub fn new() -> Self {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn with_git(self) -> Self {
        git_init(self.path());
        self
    }

    /// A repository with one committed file, so HEAD exists.
    pub fn with_initial_commit(self) -> Self {
        let repo = self.with_git();
        repo.write_file("README.md", "# test\n");
        repo.git(&["add", "README.md"]);
        repo.git(&["commit", "-m", "initial commit"]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn write_file(&self, file_name: &str, content: &str) -> PathBuf {
        let file_path = self.path().join(file_name);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir for file");
        }
        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    pub fn git(&self, args: &[&str]) -> String {
        run_git_command(self.path(), args)
    }

    pub fn commit_count(&self) -> usize {
        let output = Command::new("git")
            .current_dir(self.path())
            .args(["rev-list", "--count", "HEAD"])
            .output()
            .expect("Failed to run git rev-list");
        if !output.status.success() {
            // unborn branch
            return 0;
        }
        String::from_utf8_lossy(&output.stdout).trim().parse().unwrap()
    }

    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"]).trim().to_string()
    }

    pub fn head_message(&self) -> String {
        self.git(&["log", "-1", "--pretty=%B"]).trim().to_string()
    }

    pub fn tags(&self) -> Vec<String> {
        self.git(&["tag", "--list"])
            .lines()
            .map(String::from)
            .collect()
    }

    /// Files recorded in HEAD, sorted.
    pub fn head_files(&self) -> Vec<String> {
        let mut files: Vec<String> = self
            .git(&["ls-tree", "-r", "--name-only", "HEAD"])
            .lines()
            .map(String::from)
            .collect();
        files.sort();
        files
    }

    pub fn is_clean(&self) -> bool {
        self.git(&["status", "--porcelain", "--untracked-files=all"])
            .trim()
            .is_empty()
    }
}

pub fn run_git_command(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .unwrap_or_else(|_| panic!("Failed to execute git command: {:?}", args));
    assert!(
        output.status.success(),
        "Git command failed: {:?}, stderr: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn git_init(dir: &Path) {
    run_git_command(dir, &["init", "--quiet"]);
    run_git_command(dir, &["config", "user.name", "Test User"]);
    run_git_command(dir, &["config", "user.email", "test@example.com"]);
    run_git_command(dir, &["config", "commit.gpgsign", "false"]);
    run_git_command(dir, &["config", "tag.gpgsign", "false"]);
}
