use crate::commands::{open_workbench, print_snapshot, repo_relative};
use crate::core::{
    colors::colorize_diff_line,
    error::{Result, WorkbenchError},
    git::DiffSide,
    output::{pluralize, print_info, print_success},
    session::Workbench,
};
use colored::*;
use std::path::{Path, PathBuf};

/// List the hunks of one file's unstaged (or staged) changes, numbered from 1
pub fn execute_hunks(path: PathBuf, staged: bool) -> Result<()> {
    let workbench = open_workbench()?;
    let side = if staged { DiffSide::Staged } else { DiffSide::Unstaged };
    let relative = repo_relative(workbench.workdir(), &path)?;

    let patches = workbench.load_patch_set(side, Some(&relative))?;
    let Some(patch) = patches.patches.first() else {
        print_info(&format!("No {} changes in {}", side_label(side), relative.display()));
        return Ok(());
    };

    if patch.is_binary {
        print_info(&patch.display_text());
        return Ok(());
    }

    println!();
    println!(
        "{} ({}, +{} -{})",
        relative.display().to_string().bold(),
        pluralize(patch.hunks.len(), "hunk"),
        patch.added_count(),
        patch.removed_count()
    );
    for (i, hunk) in patch.hunks.iter().enumerate() {
        println!();
        println!(
            "{} {}",
            format!("[{}]", i + 1).cyan().bold(),
            format!("+{} -{}", hunk.added_count(), hunk.removed_count()).bright_black()
        );
        for line in hunk.to_text().lines() {
            println!("    {}", colorize_diff_line(line));
        }
    }
    println!();
    Ok(())
}

pub fn execute_stage_hunk(path: PathBuf, hunk: usize) -> Result<()> {
    let workbench = open_workbench()?;
    let (relative, patch_index, hunk_index) =
        locate_hunk(&workbench, DiffSide::Unstaged, &path, hunk)?;

    workbench.stage_hunk(patch_index, hunk_index)?;
    print_success(&format!("Staged hunk {hunk} of {}.", relative.display()));
    print_snapshot(&workbench.get_status_snapshot());
    Ok(())
}

pub fn execute_unstage_hunk(path: PathBuf, hunk: usize) -> Result<()> {
    let workbench = open_workbench()?;
    let (relative, patch_index, hunk_index) =
        locate_hunk(&workbench, DiffSide::Staged, &path, hunk)?;

    workbench.unstage_hunk(patch_index, hunk_index)?;
    print_success(&format!("Unstaged hunk {hunk} of {}.", relative.display()));
    print_snapshot(&workbench.get_status_snapshot());
    Ok(())
}

pub fn execute_discard_hunk(path: PathBuf, hunk: usize) -> Result<()> {
    let workbench = open_workbench()?;
    let (relative, patch_index, hunk_index) =
        locate_hunk(&workbench, DiffSide::Unstaged, &path, hunk)?;

    workbench.discard_hunk(patch_index, hunk_index)?;
    print_success(&format!("Discarded hunk {hunk} of {}.", relative.display()));
    print_snapshot(&workbench.get_status_snapshot());
    Ok(())
}

/// Publish the patch set for `path` and resolve a 1-based hunk number against it
fn locate_hunk(
    workbench: &Workbench,
    side: DiffSide,
    path: &Path,
    hunk: usize,
) -> Result<(PathBuf, usize, usize)> {
    let relative = repo_relative(workbench.workdir(), path)?;
    let patches = workbench.load_patch_set(side, Some(&relative))?;
    let patch_index = patches
        .position(&relative)
        .ok_or_else(|| WorkbenchError::not_found(&relative))?;

    let count = patches.patch(patch_index)?.hunks.len();
    if hunk == 0 || hunk > count {
        return Err(WorkbenchError::hunk_index_out_of_range(hunk, count));
    }

    Ok((relative, patch_index, hunk - 1))
}

fn side_label(side: DiffSide) -> &'static str {
    match side {
        DiffSide::Staged => "staged",
        DiffSide::Unstaged => "unstaged",
    }
}
