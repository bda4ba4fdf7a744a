//! Builds the staged / unstaged / untracked snapshot.
//!
//! The builder reads raw status values, classifies each one, and decorates the entries
//! with line counts taken from the staged (HEAD to index) and unstaged (index to worktree,
//! untracked content included) diffs. It is read-only and safe to run on a worker thread
//! with its own repository handle.

use crate::core::{
    config::WorkbenchConfig,
    error::Result,
    git::{DiffSide, GitRepo},
    state::{FileStatusEntry, StatusSnapshot},
    status_flag::{classify, Category},
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

type LineStats = HashMap<PathBuf, (usize, usize)>;

pub struct StatusSnapshotBuilder<'r> {
    repo: &'r GitRepo,
    config: &'r WorkbenchConfig,
}

impl<'r> StatusSnapshotBuilder<'r> {
    pub fn new(repo: &'r GitRepo, config: &'r WorkbenchConfig) -> Self {
        Self { repo, config }
    }

    pub fn build(&self) -> Result<StatusSnapshot> {
        let mut snapshot = StatusSnapshot::new();

        for (path, raw) in self.repo.read_status(self.config)? {
            for (flag, category) in classify(raw) {
                let mut entry = FileStatusEntry::new(&path, flag, category);
                entry.mime_class = mime_class(&path).to_string();
                snapshot.insert(entry);
            }
        }

        let staged = self.line_stats(DiffSide::Staged);
        let unstaged = self.line_stats(DiffSide::Unstaged);

        for category in [Category::Staged, Category::Unstaged, Category::Untracked] {
            let stats = match category {
                Category::Staged => &staged,
                Category::Unstaged | Category::Untracked => &unstaged,
            };
            let list = match category {
                Category::Staged => &mut snapshot.staged,
                Category::Unstaged => &mut snapshot.unstaged,
                Category::Untracked => &mut snapshot.untracked,
            };
            for entry in list.iter_mut() {
                if let Some(&(added, deleted)) = stats.get(&entry.path) {
                    entry.added_lines = added;
                    entry.deleted_lines = deleted;
                }
            }
        }

        snapshot.sort();
        log::debug!(
            "Snapshot: {} staged, {} unstaged, {} untracked",
            snapshot.staged.len(),
            snapshot.unstaged.len(),
            snapshot.untracked.len()
        );
        Ok(snapshot)
    }

    /// Added/deleted counts per path; a failed diff only costs the counts
    fn line_stats(&self, side: DiffSide) -> LineStats {
        match self.collect_line_stats(side) {
            Ok(stats) => stats,
            Err(e) => {
                log::warn!("Line statistics for {side:?} changes unavailable: {e}");
                LineStats::new()
            }
        }
    }

    fn collect_line_stats(&self, side: DiffSide) -> Result<LineStats> {
        let diff = self.repo.diff(side, None, self.config)?;
        let mut stats = LineStats::new();

        for idx in 0..diff.deltas().len() {
            let Some(delta) = diff.get_delta(idx) else {
                continue;
            };
            let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) else {
                continue;
            };
            let path = path.to_path_buf();

            let counts = match git2::Patch::from_diff(&diff, idx)? {
                Some(patch) if !patch.delta().flags().is_binary() => {
                    let (_, added, deleted) = patch.line_stats()?;
                    (added, deleted)
                }
                _ => (0, 0),
            };
            stats.insert(path, counts);
        }

        Ok(stats)
    }
}

/// Coarse content class from the file extension
pub fn mime_class(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("txt" | "md" | "rst" | "org" | "log") => "text/plain",
        Some("rs" | "py" | "js" | "ts" | "c" | "h" | "cpp" | "hpp" | "go" | "java" | "rb"
            | "sh" | "el" | "lua" | "swift" | "kt") => "text/x-source",
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("toml" | "yaml" | "yml" | "ini" | "cfg") => "text/x-config",
        Some("xml") => "application/xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz" | "tgz") => "application/gzip",
        None if path.file_name().is_some_and(|name| name == "Makefile") => "text/x-source",
        _ => "application/octet-stream",
    }
}
