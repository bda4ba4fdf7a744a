//! Git Workbench - staging, unstaging and discarding changes down to single hunks.
//!
//! The library classifies working tree status into staged, unstaged and untracked lists,
//! parses diffs into hunks, and rewrites index entries or working copy files so that
//! exactly one hunk is applied or reverted.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module, which provides:
//! - [`Workbench`]: the session the application talks to
//! - Status classification and the snapshot data model
//! - The patch model and streaming reconstruction
//! - Error handling and result types

pub mod commands;
pub mod core;

// Re-export the core public API for external users
pub use core::{
    Category,
    ChangeFlag,
    DiffSide,
    FileStatusEntry,
    GitRepo,
    Mutation,
    ParsedPatchSet,
    Result,
    SelectionPointer,
    StatusSnapshot,
    Workbench,
    WorkbenchConfig,
    WorkbenchError,
};
