//! Git repository management and setup utilities
//!
//! Provides functions for creating test repositories in various states. Repositories are
//! built with the `git` binary so the engine is exercised against what git itself writes.

#![allow(dead_code)]

use git_workbench::core::error::Result;
use git_workbench::{Workbench, WorkbenchConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test repository setup result. The TempDir must be kept alive for the duration
/// of the test to prevent cleanup.
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub path: PathBuf,
}

impl TestRepo {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a session on this repository with default configuration
    pub fn workbench(&self) -> Result<Workbench> {
        Workbench::open(&self.path, WorkbenchConfig::default())
    }

    pub fn read(&self, filename: &str) -> Result<String> {
        Ok(fs::read_to_string(self.path.join(filename))?)
    }
}

fn run_git(repo_path: &Path, args: &[&str]) -> Result<String> {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Sets up a fresh git repository with user configuration set
pub fn setup_test_repo() -> Result<TestRepo> {
    let temp_dir = TempDir::new()?;
    let repo_path = temp_dir.path().to_path_buf();

    run_git(&repo_path, &["init"])?;
    run_git(&repo_path, &["config", "user.name", "Test User"])?;
    run_git(&repo_path, &["config", "user.email", "test@example.com"])?;
    run_git(&repo_path, &["config", "core.autocrlf", "false"])?;

    Ok(TestRepo {
        temp_dir,
        path: repo_path,
    })
}

/// Sets up a git repository with an initial commit containing "initial.txt"
pub fn setup_test_repo_with_initial_commit() -> Result<TestRepo> {
    let repo = setup_test_repo()?;

    create_file(&repo.path, "initial.txt", "initial content\n")?;
    git_add(&repo.path, "initial.txt")?;
    git_commit(&repo.path, "Initial commit")?;

    Ok(repo)
}

pub fn create_file(repo_path: &Path, filename: &str, content: &str) -> Result<()> {
    let path = repo_path.join(filename);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

pub fn create_binary_file(repo_path: &Path, filename: &str, content: &[u8]) -> Result<()> {
    fs::write(repo_path.join(filename), content)?;
    Ok(())
}

pub fn remove_file(repo_path: &Path, filename: &str) -> Result<()> {
    fs::remove_file(repo_path.join(filename))?;
    Ok(())
}

/// Adds a file to the git index ("." for all files)
pub fn git_add(repo_path: &Path, filename: &str) -> Result<()> {
    run_git(repo_path, &["add", filename])?;
    Ok(())
}

pub fn git_commit(repo_path: &Path, message: &str) -> Result<()> {
    run_git(repo_path, &["commit", "-m", message])?;
    Ok(())
}

/// Content of `filename` as recorded in the index
pub fn git_show_index(repo_path: &Path, filename: &str) -> Result<String> {
    run_git(repo_path, &["show", &format!(":{filename}")])
}

/// `git status --porcelain` output
pub fn git_porcelain(repo_path: &Path) -> Result<String> {
    run_git(repo_path, &["status", "--porcelain"])
}

pub fn git_log_count(repo_path: &Path) -> Result<usize> {
    let out = run_git(repo_path, &["rev-list", "--count", "HEAD"])?;
    Ok(out.trim().parse().unwrap_or(0))
}

/// Creates files with sequential content
pub fn create_test_files(repo_path: &Path, filenames: &[&str]) -> Result<()> {
    for (i, filename) in filenames.iter().enumerate() {
        let content = format!("content{}\nline 2\n", i + 1);
        create_file(repo_path, filename, &content)?;
    }
    Ok(())
}

pub fn modify_test_files(repo_path: &Path, filenames: &[&str]) -> Result<()> {
    for (i, filename) in filenames.iter().enumerate() {
        let content = format!("modified{}\nline 2\nnew line\n", i + 1);
        create_file(repo_path, filename, &content)?;
    }
    Ok(())
}
