//! Hunk-level staging, unstaging and discarding.
//!
//! [`HunkMutator::apply_hunk`] rewrites a single index entry so that exactly one hunk of a
//! parsed diff is applied (stage) or reverted (unstage). The new content is written as a
//! blob first; the index is only touched once the blob exists, and only if the entry has
//! not changed underneath us in the meantime.

use crate::core::{
    error::{Result, WorkbenchError},
    git::GitRepo,
    patch::{Hunk, LineKind, ParsedPatch, ParsedPatchSet},
    patch_stream::{reconstruct_to_vec, split_lines},
};
use git2::{IndexEntry, IndexTime};
use std::path::{Path, PathBuf};

pub struct HunkMutator<'r> {
    repo: &'r GitRepo,
}

/// What a hunk mutation changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkOutcome {
    pub path: PathBuf,
    pub old_id: git2::Oid,
    pub new_id: git2::Oid,
}

impl<'r> HunkMutator<'r> {
    pub fn new(repo: &'r GitRepo) -> Self {
        Self { repo }
    }

    /// Apply (`revert == false`) or revert (`revert == true`) one hunk against the index.
    ///
    /// Forward hunks come from the index-to-worktree diff, reverted ones from the
    /// HEAD-to-index diff; both have the index content on the side being rewritten.
    pub fn apply_hunk(
        &self,
        patch_set: &ParsedPatchSet,
        patch_index: usize,
        hunk_index: usize,
        revert: bool,
    ) -> Result<HunkOutcome> {
        let (patch, hunk) = select(patch_set, patch_index, hunk_index)?;
        let selected = if revert { hunk.mirrored() } else { hunk.clone() };

        let mut index = self.repo.read_index()?;
        let (entry, content) = self.repo.indexed_blob(&index, &patch.path)?;

        if !matches_source(&content, &selected) {
            return Err(WorkbenchError::concurrent_modification(&patch.path));
        }

        let new_content = reconstruct_to_vec(&content, std::slice::from_ref(&selected));
        let new_id = self.repo.write_blob(&new_content)?;

        // Reload from disk so an index written by someone else since we read it is noticed
        index.read(true)?;
        let old_id = entry.id;
        match index.get_path(&patch.path, 0) {
            Some(current) if current.id == old_id => {}
            _ => return Err(WorkbenchError::concurrent_modification(&patch.path)),
        }

        // The blob no longer matches the file on disk, so drop the stat data
        let updated = IndexEntry {
            id: new_id,
            file_size: new_content.len() as u32,
            ctime: IndexTime::new(0, 0),
            mtime: IndexTime::new(0, 0),
            ..entry
        };
        index.add(&updated)?;
        self.repo.write_index(&mut index)?;

        log::debug!(
            "{} hunk {hunk_index} of {}: {old_id} -> {new_id}",
            if revert { "Reverted" } else { "Applied" },
            patch.path.display()
        );

        Ok(HunkOutcome {
            path: patch.path.clone(),
            old_id,
            new_id,
        })
    }

    /// Revert one hunk of the index-to-worktree diff in the working copy file itself.
    ///
    /// Returns the absolute path of the rewritten file.
    pub fn discard_hunk(
        &self,
        patch_set: &ParsedPatchSet,
        patch_index: usize,
        hunk_index: usize,
    ) -> Result<PathBuf> {
        let (patch, hunk) = select(patch_set, patch_index, hunk_index)?;
        let mirrored = hunk.mirrored();

        let absolute = self.repo.workdir()?.join(&patch.path);
        let content = read_worktree_file(&absolute, &patch.path)?;

        if !matches_source(&content, &mirrored) {
            return Err(WorkbenchError::concurrent_modification(&patch.path));
        }

        let restored = reconstruct_to_vec(&content, std::slice::from_ref(&mirrored));
        std::fs::write(&absolute, restored)
            .map_err(|e| WorkbenchError::write_error(absolute.display().to_string(), e))?;

        log::debug!(
            "Discarded hunk {hunk_index} of {}",
            patch.path.display()
        );
        Ok(absolute)
    }
}

fn select(
    patch_set: &ParsedPatchSet,
    patch_index: usize,
    hunk_index: usize,
) -> Result<(&ParsedPatch, &Hunk)> {
    let patch = patch_set.patch(patch_index)?;
    if patch.is_binary {
        return Err(WorkbenchError::binary_content(&patch.path));
    }
    let hunk = patch.hunk(hunk_index)?;
    Ok((patch, hunk))
}

fn read_worktree_file(absolute: &Path, relative: &Path) -> Result<Vec<u8>> {
    match std::fs::read(absolute) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(WorkbenchError::not_found(relative))
        }
        Err(e) => Err(e.into()),
    }
}

fn without_terminator(line: &[u8]) -> &[u8] {
    match line.strip_suffix(b"\n") {
        Some(line) => line.strip_suffix(b"\r").unwrap_or(line),
        None => line,
    }
}

/// Whether the context and removed lines of `hunk` are still what `content` holds
/// at the hunk's source position. Terminator style is not compared.
fn matches_source(content: &[u8], hunk: &Hunk) -> bool {
    let lines = split_lines(content);
    let expected = hunk
        .lines
        .iter()
        .filter(|line| line.kind != LineKind::Added);

    let mut position = hunk.lines_before();
    for line in expected {
        match lines.get(position) {
            Some(actual) if without_terminator(actual) == without_terminator(&line.content) => {
                position += 1
            }
            _ => return false,
        }
    }
    true
}
