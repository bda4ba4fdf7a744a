//! Predefined repository scenarios
//!
//! Each function returns a repository in a specific state so tests share setups.

#![allow(dead_code)]

use super::repository::*;
use git_workbench::core::error::Result;

/// Ten numbered lines, so edits near the top and bottom land in separate hunks
pub const TEN_LINES: &str = "1\n2\n3\n4\n5\n6\n7\n8\n9\n10\n";

/// Committed files 1-3 modified in the working copy, plus untracked files 4 and 5
pub fn create_multi_file_repo() -> Result<TestRepo> {
    let repo = setup_test_repo()?;

    create_test_files(&repo.path, &["file1.txt", "file2.txt", "file3.txt"])?;
    git_add(&repo.path, ".")?;
    git_commit(&repo.path, "Initial commit")?;

    modify_test_files(&repo.path, &["file1.txt", "file2.txt", "file3.txt"])?;
    create_test_files(&repo.path, &["file4.txt", "file5.txt"])?;

    Ok(repo)
}

/// `numbers.txt` committed with [`TEN_LINES`], then edited at line 1 and line 10.
/// The unstaged diff has two hunks.
pub fn create_two_hunk_repo() -> Result<TestRepo> {
    let repo = setup_test_repo()?;

    create_file(&repo.path, "numbers.txt", TEN_LINES)?;
    git_add(&repo.path, "numbers.txt")?;
    git_commit(&repo.path, "Add numbers")?;

    create_file(
        &repo.path,
        "numbers.txt",
        "one\n2\n3\n4\n5\n6\n7\n8\n9\nten\n",
    )?;
    Ok(repo)
}

/// `a.txt` committed as "a\nb\nc\n" and edited to "a\nx\nc\n": a single hunk
pub fn create_single_hunk_repo() -> Result<TestRepo> {
    let repo = setup_test_repo()?;

    create_file(&repo.path, "a.txt", "a\nb\nc\n")?;
    git_add(&repo.path, "a.txt")?;
    git_commit(&repo.path, "Add a")?;

    create_file(&repo.path, "a.txt", "a\nx\nc\n")?;
    Ok(repo)
}

/// A repository with `count` commits, one file change each
pub fn create_history_repo(count: usize) -> Result<TestRepo> {
    let repo = setup_test_repo()?;
    for i in 1..=count {
        create_file(&repo.path, "history.txt", &format!("revision {i}\n"))?;
        git_add(&repo.path, "history.txt")?;
        git_commit(&repo.path, &format!("Commit number {i}"))?;
    }
    Ok(repo)
}
