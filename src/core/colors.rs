//! Color mapping for change kinds and diff lines.
//!
//! # Public API
//! - [`get_flag_color_style`]: Color function for a change flag
//! - [`get_aligned_kind`]: Colored kind label padded to a fixed width
//! - [`get_colored_path`]: Apply the flag color to a path
//! - [`format_file_status`]: Complete status line for one entry
//! - [`colorize_diff_line`]: Color one line of patch text
//!
//! # Color Scheme
//! - **Modified**: Yellow
//! - **New**: Green in the index, cyan when untracked
//! - **Deleted**: Red
//! - **Renamed**: Blue
//! - **Typechange**: Magenta
//! - **Conflicted**: Red bold

use crate::core::state::FileStatusEntry;
use crate::core::status_flag::ChangeFlag;
use colored::*;

const KIND_WIDTH: usize = 10;

pub fn get_flag_color_style(flag: ChangeFlag) -> Box<dyn Fn(&str) -> ColoredString> {
    match flag {
        ChangeFlag::IndexModified | ChangeFlag::WtModified => Box::new(|text: &str| text.yellow()),
        ChangeFlag::IndexNew => Box::new(|text: &str| text.green()),
        ChangeFlag::WtNew => Box::new(|text: &str| text.cyan()),
        ChangeFlag::IndexDeleted | ChangeFlag::WtDeleted => Box::new(|text: &str| text.red()),
        ChangeFlag::IndexRenamed | ChangeFlag::WtRenamed => Box::new(|text: &str| text.blue()),
        ChangeFlag::IndexTypechange | ChangeFlag::WtTypechange => {
            Box::new(|text: &str| text.magenta())
        }
        ChangeFlag::Conflicted => Box::new(|text: &str| text.red().bold()),
        ChangeFlag::WtUnreadable | ChangeFlag::Current | ChangeFlag::Ignored => {
            Box::new(|text: &str| text.bright_black())
        }
    }
}

/// Kind label padded so paths line up
pub fn get_aligned_kind(flag: ChangeFlag) -> ColoredString {
    let color_fn = get_flag_color_style(flag);
    color_fn(&format!("{:<KIND_WIDTH$}", flag.kind()))
}

pub fn get_colored_path(flag: ChangeFlag, path: &str) -> ColoredString {
    let color_fn = get_flag_color_style(flag);
    color_fn(path)
}

/// `[index] Kind       path  +added -deleted`
pub fn format_file_status(index: usize, entry: &FileStatusEntry) -> String {
    let index_colored = format!("[{index}]").cyan().bold();
    let kind_colored = get_aligned_kind(entry.flag);
    let path_colored = get_colored_path(entry.flag, &entry.path.display().to_string());

    let mut line = format!("{index_colored} {kind_colored} {path_colored}");
    if entry.added_lines > 0 || entry.deleted_lines > 0 {
        let added = format!("+{}", entry.added_lines).green();
        let deleted = format!("-{}", entry.deleted_lines).red();
        line.push_str(&format!("  {added} {deleted}"));
    }
    line
}

/// Color one line of unified-diff text by its leading character
pub fn colorize_diff_line(line: &str) -> ColoredString {
    if line.starts_with("@@") {
        line.cyan()
    } else if line.starts_with("+++") || line.starts_with("---") || line.starts_with("diff ") {
        line.bold()
    } else if line.starts_with('+') {
        line.green()
    } else if line.starts_with('-') {
        line.red()
    } else {
        line.normal()
    }
}
