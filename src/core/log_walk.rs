//! Incremental commit log walk.
//!
//! History is walked from HEAD in topological and time order and handed out in batches,
//! so a consumer can render a growing list while older history is still being read.
//! [`spawn_log_walk`] runs the walk on its own thread with its own repository handle and
//! streams [`LogMessage`]s over a channel, always finishing with `Done` or `Failed`.

use crate::core::{error::Result, git::GitRepo};
use chrono::DateTime;
use git2::{Commit, Sort};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub short_id: String,
    /// Commit time in UTC, formatted with [`TIME_FORMAT`]
    pub time: String,
    pub author: String,
    /// Full message without trailing whitespace
    pub message: String,
    /// First line of the message
    pub summary: String,
}

impl LogEntry {
    fn from_commit(commit: &Commit<'_>) -> Self {
        let id = commit.id().to_string();
        let time = DateTime::from_timestamp(commit.time().seconds(), 0)
            .map(|t| t.format(TIME_FORMAT).to_string())
            .unwrap_or_default();

        Self {
            short_id: id.chars().take(7).collect(),
            id,
            time,
            author: commit.author().name().unwrap_or("").to_string(),
            message: String::from_utf8_lossy(commit.message_bytes())
                .trim_end()
                .to_string(),
            summary: commit.summary().unwrap_or("").to_string(),
        }
    }
}

#[derive(Debug)]
pub enum LogMessage {
    Batch(Vec<LogEntry>),
    Done,
    Failed(crate::core::error::WorkbenchError),
}

/// Walk history from HEAD, handing batches of at most `batch_size` entries to `sink`.
///
/// Stops early once `limit` commits were produced or `sink` returns false. An unborn HEAD
/// produces no batches. Returns the number of commits produced.
pub fn walk_log<F>(
    repo: &GitRepo,
    batch_size: usize,
    limit: Option<usize>,
    mut sink: F,
) -> Result<usize>
where
    F: FnMut(Vec<LogEntry>) -> bool,
{
    if repo.head_tree()?.is_none() {
        log::debug!("Unborn HEAD, no history to walk");
        return Ok(0);
    }

    let git = repo.get_repository();
    let mut revwalk = git.revwalk()?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
    revwalk.push_head()?;

    let batch_size = batch_size.max(1);
    let limit = limit.unwrap_or(usize::MAX);
    let mut batch = Vec::with_capacity(batch_size);
    let mut produced = 0;

    for oid in revwalk {
        if produced == limit {
            break;
        }
        let commit = git.find_commit(oid?)?;
        batch.push(LogEntry::from_commit(&commit));
        produced += 1;

        if batch.len() == batch_size && !sink(std::mem::take(&mut batch)) {
            log::debug!("Log consumer went away after {produced} commits");
            return Ok(produced);
        }
    }

    if !batch.is_empty() {
        sink(batch);
    }
    Ok(produced)
}

/// Run [`walk_log`] on a worker thread against the repository at `path`
pub fn spawn_log_walk(
    path: PathBuf,
    batch_size: usize,
    limit: Option<usize>,
) -> Receiver<LogMessage> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let outcome = GitRepo::open(&path).and_then(|repo| {
            walk_log(&repo, batch_size, limit, |batch| {
                tx.send(LogMessage::Batch(batch)).is_ok()
            })
        });

        let last = match outcome {
            Ok(count) => {
                log::debug!("Log walk finished with {count} commits");
                LogMessage::Done
            }
            Err(e) => LogMessage::Failed(e),
        };
        // The receiver may already be gone
        let _ = tx.send(last);
    });

    rx
}
