//! Common assertion helpers for test output validation

#![allow(dead_code)]

use predicates::prelude::*;

pub fn not_in_git_repo() -> impl Predicate<str> {
    predicates::str::contains("Not in a git repository")
}

pub fn has_branch_info() -> impl Predicate<str> {
    predicates::str::contains("Branch:")
}

pub fn has_parent_info() -> impl Predicate<str> {
    predicates::str::contains("Parent:")
}

/// Checks for a numbered entry, e.g. `[1]`
pub fn has_file_index(index: u32) -> impl Predicate<str> {
    predicates::str::contains(format!("[{index}]"))
}

/// Checks for a section heading: "Staged", "Not staged" or "Untracked"
pub fn has_section(name: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("➤ {name}:"))
}

pub fn has_kind(kind: &str) -> impl Predicate<str> {
    predicates::str::contains(kind)
}

pub fn has_error() -> impl Predicate<str> {
    predicates::str::contains("✕ Error:")
}
