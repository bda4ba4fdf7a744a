//! Status data model shared by the snapshot builder, the selection logic and the CLI.
//!
//! # Public API
//! - [`FileStatusEntry`]: One path in one category with its line statistics
//! - [`StatusSnapshot`]: The three classified lists, rebuilt wholesale on refresh
//! - [`SelectionPointer`]: Which list and which item has UI focus
//!
//! A path may sit once in `staged` and once in `unstaged` at the same time, but never
//! twice in the same list. [`StatusSnapshot::insert`] enforces that.

use crate::core::status_flag::{Category, ChangeFlag};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatusEntry {
    pub path: PathBuf,
    pub category: Category,
    pub flag: ChangeFlag,
    pub kind: String,
    pub mime_class: String,
    pub added_lines: usize,
    pub deleted_lines: usize,
}

impl FileStatusEntry {
    pub fn new(path: impl Into<PathBuf>, flag: ChangeFlag, category: Category) -> Self {
        Self {
            path: path.into(),
            category,
            flag,
            kind: flag.kind().to_string(),
            mime_class: String::new(),
            added_lines: 0,
            deleted_lines: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub staged: Vec<FileStatusEntry>,
    pub unstaged: Vec<FileStatusEntry>,
    pub untracked: Vec<FileStatusEntry>,
}

impl StatusSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, category: Category) -> &[FileStatusEntry] {
        match category {
            Category::Staged => &self.staged,
            Category::Unstaged => &self.unstaged,
            Category::Untracked => &self.untracked,
        }
    }

    fn list_mut(&mut self, category: Category) -> &mut Vec<FileStatusEntry> {
        match category {
            Category::Staged => &mut self.staged,
            Category::Unstaged => &mut self.unstaged,
            Category::Untracked => &mut self.untracked,
        }
    }

    /// Add an entry to its category unless the path is already listed there.
    /// Returns whether the entry was inserted.
    pub fn insert(&mut self, entry: FileStatusEntry) -> bool {
        let list = self.list_mut(entry.category);
        if list.iter().any(|existing| existing.path == entry.path) {
            return false;
        }
        list.push(entry);
        true
    }

    pub fn find(&self, category: Category, path: &std::path::Path) -> Option<&FileStatusEntry> {
        self.list(category).iter().find(|entry| entry.path == path)
    }

    pub fn len(&self) -> usize {
        self.staged.len() + self.unstaged.len() + self.untracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sort(&mut self) {
        for list in [&mut self.staged, &mut self.unstaged, &mut self.untracked] {
            list.sort_by(|a, b| a.path.cmp(&b.path));
        }
    }
}

/// UI focus. `index == -1` means the list itself has focus rather than an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPointer {
    pub category: Option<Category>,
    pub index: i64,
}

impl SelectionPointer {
    pub const NONE: SelectionPointer = SelectionPointer {
        category: None,
        index: -1,
    };

    pub fn item(category: Category, index: usize) -> Self {
        Self {
            category: Some(category),
            index: index as i64,
        }
    }

    pub fn list(category: Category) -> Self {
        Self {
            category: Some(category),
            index: -1,
        }
    }

    pub fn is_none(&self) -> bool {
        self.category.is_none()
    }
}

impl Default for SelectionPointer {
    fn default() -> Self {
        Self::NONE
    }
}
