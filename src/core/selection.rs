//! Focus selection after list mutations.
//!
//! After an item is removed from one list, focus stays in that list on the item above
//! when the list still has entries. Otherwise it falls back to the first non-empty list in
//! the order Unstaged, Untracked, Staged, with list-level focus (`index == -1`).

use crate::core::state::{SelectionPointer, StatusSnapshot};
use crate::core::status_flag::Category;

const FALLBACK_ORDER: [Category; 3] = [Category::Unstaged, Category::Untracked, Category::Staged];

/// Selection after removing the item at `removed_index` from `removed_from`.
///
/// The lists are the state after the removal.
pub fn next_selection<T>(
    staged: &[T],
    unstaged: &[T],
    untracked: &[T],
    removed_from: Category,
    removed_index: i64,
) -> SelectionPointer {
    let len = |category: Category| match category {
        Category::Staged => staged.len(),
        Category::Unstaged => unstaged.len(),
        Category::Untracked => untracked.len(),
    };

    if len(removed_from) > 0 {
        let index = (removed_index - 1).max(0);
        return SelectionPointer {
            category: Some(removed_from),
            index,
        };
    }

    FALLBACK_ORDER
        .into_iter()
        .find(|&category| len(category) > 0)
        .map(SelectionPointer::list)
        .unwrap_or(SelectionPointer::NONE)
}

/// [`next_selection`] over a snapshot
pub fn next_selection_in(
    snapshot: &StatusSnapshot,
    removed_from: Category,
    removed_index: i64,
) -> SelectionPointer {
    next_selection(
        &snapshot.staged,
        &snapshot.unstaged,
        &snapshot.untracked,
        removed_from,
        removed_index,
    )
}

/// Selection after items were added to `category`: the list itself gets focus
pub fn selection_after_add(category: Category) -> SelectionPointer {
    SelectionPointer::list(category)
}

/// Mutations whose resulting focus the application asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// A single item left `from` at `index`
    Removed { from: Category, index: i64 },
    /// Items were added to `to`
    Added { to: Category },
    /// Everything was staged
    StagedAll,
    /// Everything was unstaged
    UnstagedAll,
    /// Every change was discarded
    DiscardedAll,
}

/// Focus after `mutation`, given the snapshot that resulted from it
pub fn selection_after(snapshot: &StatusSnapshot, mutation: Mutation) -> SelectionPointer {
    match mutation {
        Mutation::Removed { from, index } => next_selection_in(snapshot, from, index),
        Mutation::Added { to } => selection_after_add(to),
        Mutation::StagedAll => selection_after_add(Category::Staged),
        Mutation::UnstagedAll | Mutation::DiscardedAll => {
            next_selection_in(snapshot, Category::Staged, 0)
        }
    }
}
