use crate::commands::open_workbench;
use crate::core::{
    error::Result,
    log_walk::{LogEntry, LogMessage},
    output::print_info,
};
use colored::*;

/// Print history from HEAD as batches arrive from the walker thread
pub fn execute_log(limit: Option<usize>) -> Result<()> {
    let workbench = open_workbench()?;
    let receiver = workbench.start_log_walk(limit);
    let mut shown = 0;

    println!();
    for message in receiver {
        match message {
            LogMessage::Batch(entries) => {
                for entry in &entries {
                    print_log_line(entry);
                }
                shown += entries.len();
            }
            LogMessage::Done => break,
            LogMessage::Failed(e) => return Err(e),
        }
    }

    if shown == 0 {
        print_info("No commits yet");
    } else {
        println!();
    }
    Ok(())
}

fn print_log_line(entry: &LogEntry) {
    println!(
        "{} {} {} {}",
        entry.short_id.yellow(),
        entry.time.bright_black(),
        entry.author.cyan(),
        entry.summary
    );
}
