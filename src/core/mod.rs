//! Core functionality for git-workbench.
//!
//! This module provides the mutation engine: status classification, the patch model and
//! streaming reconstruction, hunk and whole-file mutations, selection logic, and the
//! session that ties them together.

pub mod colors;
pub mod config;
pub mod dirs;
pub mod error;
pub mod git;
pub mod hunk;
pub mod log_walk;
pub mod output;
pub mod patch;
pub mod patch_stream;
pub mod selection;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod status_flag;

// === Error handling ===
pub use error::{Result, WorkbenchError};

// === Repository access ===
pub use git::{DiffSide, GitRepo};

// === Status classification and data model ===
pub use snapshot::StatusSnapshotBuilder;
pub use state::{FileStatusEntry, SelectionPointer, StatusSnapshot};
pub use status_flag::{classify, Category, ChangeFlag};

// === Patches and hunk mutations ===
pub use hunk::{HunkMutator, HunkOutcome};
pub use patch::{Hunk, Line, LineKind, ParsedPatch, ParsedPatchSet, BINARY_PATCH_PLACEHOLDER};
pub use patch_stream::{reconstruct, LineEnding, PatchStream};

// === Selection ===
pub use selection::{next_selection, selection_after, Mutation};

// === Session ===
pub use config::WorkbenchConfig;
pub use log_walk::{LogEntry, LogMessage};
pub use session::{PollEvent, Workbench};

// === Output formatting ===
pub use output::{print_error, print_info, print_success};
