//! Raw status flag classification.
//!
//! This module defines [`ChangeFlag`], one bit of a raw status value as reported by the
//! repository layer, and [`classify`] which splits a raw value into the categories a
//! path belongs to.
//!
//! # Public API
//! - [`ChangeFlag`]: One kind of change at one storage location
//! - [`Category`]: Staged, Unstaged or Untracked bucket
//! - [`classify`]: Raw value to (flag, category) pairs
//! - [`PAIR_TABLE`]: Every valid two-flag combination, precomputed
//!
//! # Classification Rules
//! - A raw value equal to one known flag is classified directly
//! - Otherwise it must be the OR of exactly two known flags, found in [`PAIR_TABLE`]
//! - `Ignored` and `Current` never appear in the output
//! - Anything else is dropped

use serde::{Deserialize, Serialize};
use std::fmt;

/// One kind of change at one storage location.
///
/// Bit values match libgit2's `git_status_t`, so a raw `git2::Status` converts losslessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeFlag {
    Current,
    IndexNew,
    IndexModified,
    IndexDeleted,
    IndexRenamed,
    IndexTypechange,
    WtNew,
    WtModified,
    WtDeleted,
    WtTypechange,
    WtRenamed,
    WtUnreadable,
    Ignored,
    Conflicted,
}

/// Bucket a changed path is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Staged,
    Unstaged,
    Untracked,
}

/// Non-zero flags in libgit2 bit order. `Current` is zero and cannot take part in a pair.
pub const KNOWN_FLAGS: [ChangeFlag; 13] = [
    ChangeFlag::IndexNew,
    ChangeFlag::IndexModified,
    ChangeFlag::IndexDeleted,
    ChangeFlag::IndexRenamed,
    ChangeFlag::IndexTypechange,
    ChangeFlag::WtNew,
    ChangeFlag::WtModified,
    ChangeFlag::WtDeleted,
    ChangeFlag::WtTypechange,
    ChangeFlag::WtRenamed,
    ChangeFlag::WtUnreadable,
    ChangeFlag::Ignored,
    ChangeFlag::Conflicted,
];

/// A raw value that decomposes into exactly two known flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagPair {
    pub raw: u32,
    pub first: ChangeFlag,
    pub second: ChangeFlag,
}

const PAIR_COUNT: usize = KNOWN_FLAGS.len() * (KNOWN_FLAGS.len() - 1) / 2;

/// Every unordered pair of distinct known flags with its OR-ed raw value.
///
/// Flags are distinct single bits, so each raw value appears at most once.
pub const PAIR_TABLE: [FlagPair; PAIR_COUNT] = build_pair_table();

const fn build_pair_table() -> [FlagPair; PAIR_COUNT] {
    let mut table = [FlagPair {
        raw: 0,
        first: ChangeFlag::Current,
        second: ChangeFlag::Current,
    }; PAIR_COUNT];

    let mut n = 0;
    let mut i = 0;
    while i < KNOWN_FLAGS.len() {
        let mut j = i + 1;
        while j < KNOWN_FLAGS.len() {
            table[n] = FlagPair {
                raw: KNOWN_FLAGS[i].bits() | KNOWN_FLAGS[j].bits(),
                first: KNOWN_FLAGS[i],
                second: KNOWN_FLAGS[j],
            };
            n += 1;
            j += 1;
        }
        i += 1;
    }

    table
}

impl ChangeFlag {
    pub const fn bits(self) -> u32 {
        match self {
            ChangeFlag::Current => 0,
            ChangeFlag::IndexNew => 1 << 0,
            ChangeFlag::IndexModified => 1 << 1,
            ChangeFlag::IndexDeleted => 1 << 2,
            ChangeFlag::IndexRenamed => 1 << 3,
            ChangeFlag::IndexTypechange => 1 << 4,
            ChangeFlag::WtNew => 1 << 7,
            ChangeFlag::WtModified => 1 << 8,
            ChangeFlag::WtDeleted => 1 << 9,
            ChangeFlag::WtTypechange => 1 << 10,
            ChangeFlag::WtRenamed => 1 << 11,
            ChangeFlag::WtUnreadable => 1 << 12,
            ChangeFlag::Ignored => 1 << 14,
            ChangeFlag::Conflicted => 1 << 15,
        }
    }

    /// Look up the flag whose value is exactly `raw`
    pub fn from_bits(raw: u32) -> Option<ChangeFlag> {
        if raw == 0 {
            return Some(ChangeFlag::Current);
        }
        KNOWN_FLAGS.iter().copied().find(|flag| flag.bits() == raw)
    }

    /// Human label shown next to a path
    pub fn kind(self) -> &'static str {
        match self {
            ChangeFlag::Current => "Current",
            ChangeFlag::IndexNew | ChangeFlag::WtNew => "New",
            ChangeFlag::IndexModified | ChangeFlag::WtModified => "Modified",
            ChangeFlag::IndexDeleted | ChangeFlag::WtDeleted => "Deleted",
            ChangeFlag::IndexRenamed | ChangeFlag::WtRenamed => "Renamed",
            ChangeFlag::IndexTypechange | ChangeFlag::WtTypechange => "Typechange",
            ChangeFlag::WtUnreadable => "Unreadable",
            ChangeFlag::Ignored => "Ignored",
            ChangeFlag::Conflicted => "Conflicted",
        }
    }

    /// Category this flag lands in, or None for flags that are never listed
    pub fn category(self) -> Option<Category> {
        match self {
            ChangeFlag::Current | ChangeFlag::Ignored => None,
            ChangeFlag::IndexNew
            | ChangeFlag::IndexModified
            | ChangeFlag::IndexDeleted
            | ChangeFlag::IndexRenamed
            | ChangeFlag::IndexTypechange => Some(Category::Staged),
            ChangeFlag::WtNew => Some(Category::Untracked),
            ChangeFlag::WtModified
            | ChangeFlag::WtDeleted
            | ChangeFlag::WtTypechange
            | ChangeFlag::WtRenamed
            | ChangeFlag::WtUnreadable
            | ChangeFlag::Conflicted => Some(Category::Unstaged),
        }
    }
}

impl fmt::Display for ChangeFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())
    }
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Staged => "Staged",
            Category::Unstaged => "Unstaged",
            Category::Untracked => "Untracked",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Find the two flags a combined raw value is made of
pub fn decompose(raw: u32) -> Option<(ChangeFlag, ChangeFlag)> {
    PAIR_TABLE
        .iter()
        .find(|pair| pair.raw == raw)
        .map(|pair| (pair.first, pair.second))
}

/// Split one raw status value into the (flag, category) pairs it stands for.
///
/// Total over its input: unknown values produce an empty list.
pub fn classify(raw: u32) -> Vec<(ChangeFlag, Category)> {
    let flags: Vec<ChangeFlag> = match ChangeFlag::from_bits(raw) {
        Some(flag) => vec![flag],
        None => match decompose(raw) {
            Some((first, second)) => vec![first, second],
            None => {
                log::debug!("Dropping unrecognised status value {raw:#x}");
                Vec::new()
            }
        },
    };

    flags
        .into_iter()
        .filter_map(|flag| flag.category().map(|category| (flag, category)))
        .collect()
}

impl From<git2::Status> for ChangeFlag {
    /// Single-flag conversion; combined values fall back to `Current`.
    fn from(status: git2::Status) -> Self {
        ChangeFlag::from_bits(status.bits()).unwrap_or(ChangeFlag::Current)
    }
}
