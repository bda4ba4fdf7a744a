//! Repository access and whole-file working tree mutations.
//!
//! This module provides [`GitRepo`], a thin wrapper over `git2::Repository` that exposes
//! exactly what the mutation engine consumes: raw status values, index entries and blobs,
//! the HEAD tree, staged and unstaged diffs, and the file-level primitives built on top of
//! them.
//!
//! # Public API
//! - [`GitRepo`]: Repository handle
//!
//! # File-Level Primitives
//! - **stage**: add the path to the index, or remove it if it was deleted on disk
//! - **unstage**: drop the index entry and restore HEAD's version of it, if HEAD has one
//! - **discard**: force-checkout paths from HEAD, overwriting local edits
//!
//! Every primitive writes the index at most once, after all in-memory edits succeeded.
//! An unborn HEAD is not an error here: staged diffs compare against the empty tree and
//! unstaging only removes the index entry.

use crate::core::{
    config::WorkbenchConfig,
    error::{Result, WorkbenchError},
    patch::ParsedPatchSet,
};
use git2::{
    build::CheckoutBuilder, Diff, DiffOptions, ErrorCode, Index, IndexEntry, IndexTime, Oid,
    Repository, Signature, Status, StatusOptions, Tree,
};
use std::path::{Path, PathBuf};

pub struct GitRepo {
    repo: Repository,
}

/// Which side of the index a diff is taken on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffSide {
    /// HEAD tree to index
    Staged,
    /// Index to working copy
    Unstaged,
}

impl GitRepo {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path)?;
        Ok(GitRepo { repo })
    }

    pub fn get_repository(&self) -> &Repository {
        &self.repo
    }

    pub fn workdir(&self) -> Result<&Path> {
        self.repo.workdir().ok_or(WorkbenchError::BareRepository)
    }

    /// HEAD's tree, or None when HEAD is unborn
    pub fn head_tree(&self) -> Result<Option<Tree<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_tree()?)),
            Err(e) if is_unborn(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Like [`GitRepo::head_tree`] but reports an unborn HEAD as an error
    pub fn require_head_tree(&self) -> Result<Tree<'_>> {
        self.head_tree()?.ok_or(WorkbenchError::UnbornHistory)
    }

    /// Raw status value per changed path, ignored files excluded
    pub fn read_status(&self, config: &WorkbenchConfig) -> Result<Vec<(PathBuf, u32)>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(config.recurse_untracked_dirs)
            .include_ignored(false)
            .renames_head_to_index(config.detect_renames)
            .renames_index_to_workdir(config.detect_renames);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        let mut result = Vec::with_capacity(statuses.len());

        for entry in statuses.iter() {
            let path = entry.path().ok_or(WorkbenchError::InvalidUtf8Path)?;
            result.push((PathBuf::from(path), entry.status().bits()));
        }

        Ok(result)
    }

    pub fn read_index(&self) -> Result<Index> {
        Ok(self.repo.index()?)
    }

    pub fn write_index(&self, index: &mut Index) -> Result<()> {
        index
            .write()
            .map_err(|e| WorkbenchError::write_error("index", e))
    }

    /// Stage-0 index entry for a path together with its blob content
    pub fn indexed_blob(&self, index: &Index, path: &Path) -> Result<(IndexEntry, Vec<u8>)> {
        let entry = index
            .get_path(path, 0)
            .ok_or_else(|| WorkbenchError::not_found(path))?;
        let content = self.read_blob(entry.id)?;
        Ok((entry, content))
    }

    pub fn read_blob(&self, id: Oid) -> Result<Vec<u8>> {
        let blob = self.repo.find_blob(id)?;
        Ok(blob.content().to_vec())
    }

    pub fn write_blob(&self, content: &[u8]) -> Result<Oid> {
        self.repo
            .blob(content)
            .map_err(|e| WorkbenchError::write_error("blob", e))
    }

    /// Object id and file mode of `path` inside `tree`
    pub fn resolve_path_in_tree(&self, tree: &Tree<'_>, path: &Path) -> Result<(Oid, u32)> {
        match tree.get_path(path) {
            Ok(entry) => Ok((entry.id(), entry.filemode() as u32)),
            Err(e) if e.code() == ErrorCode::NotFound => Err(WorkbenchError::not_found(path)),
            Err(e) => Err(e.into()),
        }
    }

    fn diff_options(
        &self,
        config: &WorkbenchConfig,
        pathspec: Option<&Path>,
        untracked_content: bool,
    ) -> DiffOptions {
        let mut opts = DiffOptions::new();
        opts.context_lines(config.context_lines);
        if untracked_content {
            opts.include_untracked(true)
                .recurse_untracked_dirs(true)
                .show_untracked_content(true);
        }
        if let Some(path) = pathspec {
            opts.pathspec(path).disable_pathspec_match(true);
        }
        opts
    }

    /// Diff for one side of the index, optionally limited to one path.
    ///
    /// Unstaged diffs include untracked files with their full content.
    pub fn diff(
        &self,
        side: DiffSide,
        pathspec: Option<&Path>,
        config: &WorkbenchConfig,
    ) -> Result<Diff<'_>> {
        match side {
            DiffSide::Staged => {
                let mut opts = self.diff_options(config, pathspec, false);
                let index = self.repo.index()?;
                let head = self.head_tree()?;
                if head.is_none() {
                    log::debug!("Unborn HEAD, diffing index against the empty tree");
                }
                Ok(self
                    .repo
                    .diff_tree_to_index(head.as_ref(), Some(&index), Some(&mut opts))?)
            }
            DiffSide::Unstaged => {
                let mut opts = self.diff_options(config, pathspec, true);
                Ok(self.repo.diff_index_to_workdir(None, Some(&mut opts))?)
            }
        }
    }

    pub fn patch_set(
        &self,
        side: DiffSide,
        pathspec: Option<&Path>,
        config: &WorkbenchConfig,
    ) -> Result<ParsedPatchSet> {
        let diff = self.diff(side, pathspec, config)?;
        ParsedPatchSet::from_diff(&diff)
    }

    /// Stage one path: add it if it exists on disk, otherwise stage its deletion
    pub fn stage(&self, path: &Path) -> Result<()> {
        let workdir = self.workdir()?;
        let mut index = self.repo.index()?;

        if workdir.join(path).symlink_metadata().is_ok() {
            log::debug!("Adding {} to index", path.display());
            index.add_path(path)?;
        } else {
            log::debug!("Staging deletion of {}", path.display());
            index.remove_path(path)?;
        }

        self.write_index(&mut index)
    }

    /// Stage every change in the working copy, deletions included
    pub fn stage_all(&self) -> Result<()> {
        let mut index = self.repo.index()?;
        index.add_all(["."], git2::IndexAddOption::DEFAULT, None)?;
        index.update_all(["."], None)?;
        self.write_index(&mut index)
    }

    /// Unstage one path by restoring HEAD's entry for it.
    ///
    /// A path HEAD does not know, or an unborn HEAD, leaves the path out of the index.
    pub fn unstage(&self, path: &Path) -> Result<()> {
        let mut index = self.repo.index()?;
        index.remove_path(path)?;

        match self.head_tree()? {
            Some(tree) => match self.resolve_path_in_tree(&tree, path) {
                Ok((id, mode)) => {
                    log::debug!("Restoring {} from HEAD ({id})", path.display());
                    let size = self.repo.find_blob(id).map(|b| b.size()).unwrap_or(0);
                    index.add(&tree_index_entry(path, id, mode, size))?;
                }
                Err(WorkbenchError::NotFound { .. }) => {
                    log::debug!("{} is not in HEAD, leaving it untracked", path.display());
                }
                Err(e) => return Err(e),
            },
            None => {
                log::debug!("Unborn HEAD, removing {} from index only", path.display());
            }
        }

        self.write_index(&mut index)
    }

    /// Reset the whole index to HEAD, or clear it when HEAD is unborn
    pub fn unstage_all(&self) -> Result<()> {
        let mut index = self.repo.index()?;
        match self.head_tree()? {
            Some(tree) => index.read_tree(&tree)?,
            None => index.clear()?,
        }
        self.write_index(&mut index)
    }

    /// Force-checkout `paths` (all paths when empty) from HEAD.
    ///
    /// Returns the absolute paths whose content was restored.
    pub fn discard(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        self.require_head_tree()?;
        let workdir = self.workdir()?.to_path_buf();

        let restorable = Status::WT_MODIFIED
            | Status::WT_DELETED
            | Status::WT_TYPECHANGE
            | Status::INDEX_MODIFIED
            | Status::INDEX_DELETED
            | Status::INDEX_TYPECHANGE;

        let mut opts = StatusOptions::new();
        opts.include_untracked(false).include_ignored(false);
        for path in paths {
            opts.pathspec(path);
        }
        if !paths.is_empty() {
            opts.disable_pathspec_match(true);
        }

        let restored: Vec<PathBuf> = self
            .repo
            .statuses(Some(&mut opts))?
            .iter()
            .filter(|entry| entry.status().intersects(restorable))
            .filter_map(|entry| entry.path().map(|p| workdir.join(p)))
            .collect();

        let mut builder = CheckoutBuilder::new();
        builder.force();
        for path in paths {
            builder.path(path);
        }
        self.repo
            .checkout_head(Some(&mut builder))
            .map_err(|e| WorkbenchError::write_error("working tree", e))?;

        log::info!("Restored {} path(s) from HEAD", restored.len());
        Ok(restored)
    }

    /// Commit the index on top of HEAD with the configured signature
    pub fn commit(&self, message: &str) -> Result<Oid> {
        let message = message.trim();
        if message.is_empty() {
            return Err(WorkbenchError::EmptyCommitMessage);
        }

        let mut index = self.repo.index()?;
        let tree_id = index
            .write_tree()
            .map_err(|e| WorkbenchError::write_error("tree", e))?;
        let tree = self.repo.find_tree(tree_id)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if is_unborn(&e) => None,
            Err(e) => return Err(e.into()),
        };

        match &parent {
            Some(parent) if parent.tree_id() == tree_id => {
                return Err(WorkbenchError::NothingToCommit)
            }
            None if index.is_empty() => return Err(WorkbenchError::NothingToCommit),
            _ => {}
        }

        let signature = self.signature()?;
        let parents: Vec<_> = parent.iter().collect();
        let id = self
            .repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &parents,
            )
            .map_err(|e| WorkbenchError::write_error("commit", e))?;

        log::debug!("Created commit {id}");
        Ok(id)
    }

    fn signature(&self) -> Result<Signature<'static>> {
        match self.repo.signature() {
            Ok(signature) => Ok(signature),
            Err(e) if e.code() == ErrorCode::NotFound => {
                log::warn!("No user.name/user.email configured, using a placeholder signature");
                Ok(Signature::now("git-workbench", "git-workbench@localhost")?)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_current_branch(&self) -> Result<String> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if is_unborn(&e) => return Ok("-none-".to_string()),
            Err(e) => return Err(e.into()),
        };

        match (head.shorthand(), head.target()) {
            (Some(name), _) if head.is_branch() => Ok(name.to_string()),
            (_, Some(oid)) => Ok(format!("detached at {}", &oid.to_string()[..7])),
            _ => Ok("-none-".to_string()),
        }
    }

    pub fn get_parent_commit_info(&self) -> Result<(String, String)> {
        match self.repo.head() {
            Ok(head) => {
                let commit = head.peel_to_commit()?;
                let short_hash = commit.id().to_string()[..7].to_string();
                let message = commit
                    .message()
                    .unwrap_or("")
                    .lines()
                    .next()
                    .unwrap_or("")
                    .to_string();
                Ok((short_hash, message))
            }
            Err(_) => Ok(("".to_string(), "- no commits yet -".to_string())),
        }
    }
}

fn is_unborn(e: &git2::Error) -> bool {
    matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound)
}

fn tree_index_entry(path: &Path, id: Oid, mode: u32, size: usize) -> IndexEntry {
    IndexEntry {
        ctime: IndexTime::new(0, 0),
        mtime: IndexTime::new(0, 0),
        dev: 0,
        ino: 0,
        mode,
        uid: 0,
        gid: 0,
        file_size: size as u32,
        id,
        flags: 0,
        flags_extended: 0,
        path: path.to_string_lossy().into_owned().into_bytes(),
    }
}
