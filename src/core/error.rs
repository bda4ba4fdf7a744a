//! Domain-specific error types for the mutation engine.
//!
//! This module defines [`WorkbenchError`] which covers every failure a status read,
//! file mutation or hunk mutation can report. It uses `thiserror` for the enum and
//! provides constructor helpers for the variants that carry context.
//!
//! # Public API
//! - [`WorkbenchError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, WorkbenchError>`
//!
//! # Error Categories
//! - **Lookup**: path missing from index or tree, out-of-range patch/hunk indices
//! - **Writes**: object store or index writes that failed, concurrent modification
//! - **History**: unborn HEAD
//! - **Content**: binary patches that cannot be applied line by line
//! - **Config**: reading and parsing the user configuration file

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkbenchError {
    // Repository errors
    #[error("Not in a git repository")]
    NotInGitRepo,

    #[error("Git repository error: {0}")]
    Git(#[from] git2::Error),

    #[error("Invalid UTF-8 path in repository")]
    InvalidUtf8Path,

    #[error("Repository has no working directory")]
    BareRepository,

    // Lookup errors
    #[error("Path not found in index or tree: {path}")]
    NotFound { path: PathBuf },

    #[error("Patch {index} is out of range ({count} patches available)")]
    PatchIndexOutOfRange { index: usize, count: usize },

    #[error("Hunk {index} is out of range ({count} hunks available)")]
    HunkIndexOutOfRange { index: usize, count: usize },

    #[error("No commits yet: HEAD cannot be resolved to a tree")]
    UnbornHistory,

    // Content errors
    #[error("Binary content cannot be patched: {path}")]
    BinaryContent { path: PathBuf },

    #[error("Malformed diff: {message}")]
    MalformedDiff { message: String },

    // Write errors
    #[error("Failed to write {target}: {source}")]
    WriteError {
        target: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{path} changed while the hunk was being applied")]
    ConcurrentModification { path: PathBuf },

    #[error("Another mutation is still in progress")]
    MutationInProgress,

    // Commit errors
    #[error("Commit message cannot be empty")]
    EmptyCommitMessage,

    #[error("No staged changes to commit")]
    NothingToCommit,

    // File system / serialization
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not determine configuration directory")]
    ConfigDirectoryNotFound,

    #[error("Failed to read config file '{path}': {source}")]
    ConfigReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ConfigParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using WorkbenchError
pub type Result<T> = std::result::Result<T, WorkbenchError>;

impl WorkbenchError {
    /// Create a not found error for a repository-relative path
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a write error naming what was being written
    pub fn write_error<E>(target: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WriteError {
            target: target.into(),
            source: Box::new(source),
        }
    }

    pub fn binary_content(path: impl Into<PathBuf>) -> Self {
        Self::BinaryContent { path: path.into() }
    }

    pub fn concurrent_modification(path: impl Into<PathBuf>) -> Self {
        Self::ConcurrentModification { path: path.into() }
    }

    pub fn malformed_diff(message: impl Into<String>) -> Self {
        Self::MalformedDiff {
            message: message.into(),
        }
    }

    pub fn patch_index_out_of_range(index: usize, count: usize) -> Self {
        Self::PatchIndexOutOfRange { index, count }
    }

    pub fn hunk_index_out_of_range(index: usize, count: usize) -> Self {
        Self::HunkIndexOutOfRange { index, count }
    }

    pub fn config_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigReadFailed {
            path: path.into(),
            source,
        }
    }

    pub fn config_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::ConfigParseFailed {
            path: path.into(),
            source,
        }
    }

    /// True for failures that left prior state intact after a write was refused
    pub fn is_write_error(&self) -> bool {
        matches!(
            self,
            Self::WriteError { .. } | Self::ConcurrentModification { .. }
        )
    }

    /// True when the path simply is not tracked, which callers often treat as untracked
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
