use crate::commands::open_workbench;
use crate::core::{
    colors::format_file_status,
    error::Result,
    git::GitRepo,
    output::print_info,
    state::StatusSnapshot,
    status_flag::Category,
};
use colored::*;

pub fn execute_status() -> Result<()> {
    let workbench = open_workbench()?;
    let git_repo = GitRepo::open(workbench.workdir())?;

    let branch = git_repo
        .get_current_branch()
        .unwrap_or_else(|_| "-none-".to_string());
    let (hash, message) = git_repo
        .get_parent_commit_info()
        .unwrap_or_else(|_| ("".to_string(), "- no commits yet -".to_string()));

    println!();
    println!("{} {}", "Branch:".white(), branch.bold());
    if hash.is_empty() {
        println!("{} {}", "Parent:".white(), message.bright_black());
    } else {
        println!("{} {} {}", "Parent:".white(), hash.yellow(), message);
    }
    println!();

    let snapshot = workbench.get_status_snapshot();
    if snapshot.is_empty() {
        print_info("Nothing to commit, working tree clean");
        return Ok(());
    }

    print_snapshot(&snapshot);
    Ok(())
}

/// Print the three sections, numbering entries continuously across them
pub fn print_snapshot(snapshot: &StatusSnapshot) {
    let mut index = 1;

    for category in [Category::Staged, Category::Unstaged, Category::Untracked] {
        let entries = snapshot.list(category);
        if entries.is_empty() {
            continue;
        }

        let title = match category {
            Category::Staged => "➤ Staged:",
            Category::Unstaged => "➤ Not staged:",
            Category::Untracked => "➤ Untracked:",
        };
        println!("{}", title.white().bold());
        for entry in entries {
            println!("   {}", format_file_status(index, entry));
            index += 1;
        }
        println!();
    }
}
