use crate::commands::{open_workbench, print_snapshot, repo_relative};
use crate::core::{
    error::Result,
    output::{pluralize, print_success},
    session::Workbench,
};
use std::path::{Path, PathBuf};

pub fn execute_stage(paths: Vec<PathBuf>, all: bool) -> Result<()> {
    let workbench = open_workbench()?;

    if all {
        let before = workbench.get_status_snapshot();
        let count = before.unstaged.len() + before.untracked.len();
        workbench.stage_all()?;
        print_success(&format!("Staged {}.", pluralize(count, "change")));
    } else {
        let done = apply_each(&workbench, &paths, |path| workbench.stage_path(path))?;
        print_success(&format!("Staged {}.", pluralize(done, "path")));
    }

    print_snapshot(&workbench.get_status_snapshot());
    Ok(())
}

pub fn execute_unstage(paths: Vec<PathBuf>, all: bool) -> Result<()> {
    let workbench = open_workbench()?;

    if all {
        let count = workbench.get_status_snapshot().staged.len();
        workbench.unstage_all()?;
        print_success(&format!("Unstaged {}.", pluralize(count, "change")));
    } else {
        let done = apply_each(&workbench, &paths, |path| workbench.unstage_path(path))?;
        print_success(&format!("Unstaged {}.", pluralize(done, "path")));
    }

    print_snapshot(&workbench.get_status_snapshot());
    Ok(())
}

/// Restore the given paths from HEAD, or the whole tree when none are given
pub fn execute_discard(paths: Vec<PathBuf>) -> Result<()> {
    let workbench = open_workbench()?;

    let restored = if paths.is_empty() {
        workbench.discard_all()?
    } else {
        let mut restored = Vec::new();
        apply_each(&workbench, &paths, |path| {
            restored.extend(workbench.discard_path(path)?);
            Ok(())
        })?;
        restored
    };

    let count = pluralize(restored.len(), "file");
    print_success(&format!("Restored {count} from HEAD."));
    print_snapshot(&workbench.get_status_snapshot());
    Ok(())
}

/// Run `op` for every path, carrying on past failures.
///
/// Each failure is logged; if any occurred the first one is returned once all paths
/// were tried. Otherwise returns how many paths were processed.
fn apply_each<F>(workbench: &Workbench, paths: &[PathBuf], mut op: F) -> Result<usize>
where
    F: FnMut(&Path) -> Result<()>,
{
    let mut first_error = None;
    let mut done = 0;

    for arg in paths {
        let outcome = repo_relative(workbench.workdir(), arg).and_then(|path| op(&path));
        match outcome {
            Ok(()) => done += 1,
            Err(e) => {
                log::warn!("{}: {e}", arg.display());
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        Some(e) => {
            log::warn!("{done} of {} paths processed", paths.len());
            Err(e)
        }
        None => Ok(done),
    }
}
