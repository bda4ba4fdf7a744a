//! The application-facing working tree session.
//!
//! [`Workbench`] owns the current [`StatusSnapshot`] and the patch sets hunk operations
//! index into. Both are replaced wholesale, never edited in place. Mutations go through a
//! gate so at most one is in flight; each one ends with a synchronous refresh.
//!
//! Read-only work can also run in the background: [`Workbench::request_snapshot`] and
//! [`Workbench::request_patch_set`] hand the job to a worker thread that opens its own
//! repository handle, and [`Workbench::poll`] applies the replies. Every request carries a
//! tick from a single monotonically increasing counter; a reply is only applied when its
//! tick is still the latest one issued for its kind. Starting a mutation also supersedes
//! any snapshot request already in flight.
//!
//! # Public API
//! - Status: `get_status_snapshot`, `refresh`, `request_snapshot`, `poll`, `wait`
//! - Paths: `stage_path`, `unstage_path`, `discard_path`, `discard_all`, `stage_all`, `unstage_all`
//! - Hunks: `patch_set`, `request_patch_set`, `stage_hunk`, `unstage_hunk`, `discard_hunk`
//! - Other: `get_selection_after`, `commit`, `start_log_walk`

use crate::core::{
    config::WorkbenchConfig,
    error::{Result, WorkbenchError},
    git::{DiffSide, GitRepo},
    hunk::{HunkMutator, HunkOutcome},
    log_walk::{spawn_log_walk, LogMessage},
    patch::ParsedPatchSet,
    selection::{selection_after, Mutation},
    snapshot::StatusSnapshotBuilder,
    state::{SelectionPointer, StatusSnapshot},
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

/// Reply from a background worker
#[derive(Debug)]
enum WorkerReply {
    Snapshot {
        tick: u64,
        result: Result<StatusSnapshot>,
    },
    Patches {
        tick: u64,
        side: DiffSide,
        result: Result<ParsedPatchSet>,
    },
}

/// What [`Workbench::poll`] did with one worker reply
#[derive(Debug)]
pub enum PollEvent {
    SnapshotApplied { tick: u64 },
    PatchSetApplied { tick: u64, side: DiffSide },
    /// A newer request was issued before this reply arrived
    Stale { tick: u64 },
    Failed { tick: u64, error: WorkbenchError },
}

#[derive(Default)]
struct Published {
    snapshot: Arc<StatusSnapshot>,
    staged_patches: Option<Arc<ParsedPatchSet>>,
    unstaged_patches: Option<Arc<ParsedPatchSet>>,
}

impl Published {
    fn patches_mut(&mut self, side: DiffSide) -> &mut Option<Arc<ParsedPatchSet>> {
        match side {
            DiffSide::Staged => &mut self.staged_patches,
            DiffSide::Unstaged => &mut self.unstaged_patches,
        }
    }
}

pub struct Workbench {
    workdir: PathBuf,
    config: WorkbenchConfig,
    published: Mutex<Published>,
    mutation_gate: Mutex<()>,
    next_tick: AtomicU64,
    snapshot_tick: AtomicU64,
    staged_patch_tick: AtomicU64,
    unstaged_patch_tick: AtomicU64,
    sender: Sender<WorkerReply>,
    receiver: Mutex<Receiver<WorkerReply>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Workbench {
    /// Open the repository containing `path` and build the first snapshot
    pub fn open<P: AsRef<Path>>(path: P, config: WorkbenchConfig) -> Result<Self> {
        let repo = GitRepo::open(path)?;
        let workdir = repo.workdir()?.to_path_buf();
        let (sender, receiver) = mpsc::channel();

        let workbench = Self {
            workdir,
            config,
            published: Mutex::new(Published::default()),
            mutation_gate: Mutex::new(()),
            next_tick: AtomicU64::new(0),
            snapshot_tick: AtomicU64::new(0),
            staged_patch_tick: AtomicU64::new(0),
            unstaged_patch_tick: AtomicU64::new(0),
            sender,
            receiver: Mutex::new(receiver),
        };
        workbench.refresh()?;
        Ok(workbench)
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    fn repo(&self) -> Result<GitRepo> {
        GitRepo::open(&self.workdir)
    }

    fn issue_tick(&self) -> u64 {
        self.next_tick.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn patch_tick(&self, side: DiffSide) -> &AtomicU64 {
        match side {
            DiffSide::Staged => &self.staged_patch_tick,
            DiffSide::Unstaged => &self.unstaged_patch_tick,
        }
    }

    /// The most recently published snapshot
    pub fn get_status_snapshot(&self) -> Arc<StatusSnapshot> {
        Arc::clone(&lock(&self.published).snapshot)
    }

    /// Rebuild the snapshot on the calling thread and publish it.
    ///
    /// Cached patch sets are dropped since their indices may no longer be valid.
    pub fn refresh(&self) -> Result<Arc<StatusSnapshot>> {
        let tick = self.issue_tick();
        self.snapshot_tick.store(tick, Ordering::SeqCst);

        let repo = self.repo()?;
        let snapshot = Arc::new(StatusSnapshotBuilder::new(&repo, &self.config).build()?);

        let mut published = lock(&self.published);
        if self.snapshot_tick.load(Ordering::SeqCst) == tick {
            published.snapshot = Arc::clone(&snapshot);
            published.staged_patches = None;
            published.unstaged_patches = None;
        } else {
            log::warn!("Discarding snapshot {tick}, a newer one was requested");
        }
        Ok(snapshot)
    }

    /// Build a snapshot on a worker thread. The reply is applied by [`Workbench::poll`].
    pub fn request_snapshot(&self) -> u64 {
        let tick = self.issue_tick();
        self.snapshot_tick.store(tick, Ordering::SeqCst);

        let workdir = self.workdir.clone();
        let config = self.config.clone();
        let sender = self.sender.clone();
        thread::spawn(move || {
            let result = GitRepo::open(&workdir)
                .and_then(|repo| StatusSnapshotBuilder::new(&repo, &config).build());
            // The session may have been dropped meanwhile
            let _ = sender.send(WorkerReply::Snapshot { tick, result });
        });

        log::debug!("Requested snapshot {tick}");
        tick
    }

    /// Parse one side's diff, optionally limited to `path`, on a worker thread
    pub fn request_patch_set(&self, side: DiffSide, path: Option<PathBuf>) -> u64 {
        let tick = self.issue_tick();
        self.patch_tick(side).store(tick, Ordering::SeqCst);

        let workdir = self.workdir.clone();
        let config = self.config.clone();
        let sender = self.sender.clone();
        thread::spawn(move || {
            let result = GitRepo::open(&workdir)
                .and_then(|repo| repo.patch_set(side, path.as_deref(), &config));
            let _ = sender.send(WorkerReply::Patches { tick, side, result });
        });

        log::debug!("Requested {side:?} patch set {tick}");
        tick
    }

    /// Apply every worker reply that has already arrived
    pub fn poll(&self) -> Vec<PollEvent> {
        let replies: Vec<WorkerReply> = lock(&self.receiver).try_iter().collect();
        replies.into_iter().map(|reply| self.apply(reply)).collect()
    }

    /// Like [`Workbench::poll`] but waits up to `timeout` for the first reply
    pub fn wait(&self, timeout: Duration) -> Vec<PollEvent> {
        let replies: Vec<WorkerReply> = {
            let receiver = lock(&self.receiver);
            match receiver.recv_timeout(timeout) {
                Ok(first) => std::iter::once(first).chain(receiver.try_iter()).collect(),
                Err(RecvTimeoutError::Timeout) => Vec::new(),
                // We hold a sender ourselves, so this cannot happen
                Err(RecvTimeoutError::Disconnected) => Vec::new(),
            }
        };
        replies.into_iter().map(|reply| self.apply(reply)).collect()
    }

    fn apply(&self, reply: WorkerReply) -> PollEvent {
        match reply {
            WorkerReply::Snapshot { tick, result } => {
                if self.snapshot_tick.load(Ordering::SeqCst) != tick {
                    log::warn!("Discarding stale snapshot {tick}");
                    return PollEvent::Stale { tick };
                }
                match result {
                    Ok(snapshot) => {
                        let mut published = lock(&self.published);
                        published.snapshot = Arc::new(snapshot);
                        published.staged_patches = None;
                        published.unstaged_patches = None;
                        PollEvent::SnapshotApplied { tick }
                    }
                    Err(error) => PollEvent::Failed { tick, error },
                }
            }
            WorkerReply::Patches { tick, side, result } => {
                if self.patch_tick(side).load(Ordering::SeqCst) != tick {
                    log::debug!("Discarding stale {side:?} patch set {tick}");
                    return PollEvent::Stale { tick };
                }
                match result {
                    Ok(patches) => {
                        *lock(&self.published).patches_mut(side) = Some(Arc::new(patches));
                        PollEvent::PatchSetApplied { tick, side }
                    }
                    Err(error) => PollEvent::Failed { tick, error },
                }
            }
        }
    }

    /// The patch set hunk indices refer to for `side`, parsed now if none is published
    pub fn patch_set(&self, side: DiffSide) -> Result<Arc<ParsedPatchSet>> {
        if let Some(patches) = lock(&self.published).patches_mut(side).as_ref() {
            return Ok(Arc::clone(patches));
        }
        self.load_patch_set(side, None)
    }

    /// Parse and publish one side's diff limited to `path` on the calling thread
    pub fn load_patch_set(
        &self,
        side: DiffSide,
        path: Option<&Path>,
    ) -> Result<Arc<ParsedPatchSet>> {
        let tick = self.issue_tick();
        self.patch_tick(side).store(tick, Ordering::SeqCst);

        let patches = Arc::new(self.repo()?.patch_set(side, path, &self.config)?);
        *lock(&self.published).patches_mut(side) = Some(Arc::clone(&patches));
        Ok(patches)
    }

    fn begin_mutation(&self) -> Result<MutexGuard<'_, ()>> {
        let guard = match self.mutation_gate.try_lock() {
            Ok(guard) => guard,
            Err(std::sync::TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(std::sync::TryLockError::WouldBlock) => {
                return Err(WorkbenchError::MutationInProgress)
            }
        };
        // Any snapshot build already in flight predates this mutation
        let tick = self.issue_tick();
        self.snapshot_tick.store(tick, Ordering::SeqCst);
        Ok(guard)
    }

    /// Run `op` under the mutation gate, then refresh whether or not it succeeded
    fn mutate<T>(&self, op: impl FnOnce(&GitRepo) -> Result<T>) -> Result<T> {
        let _guard = self.begin_mutation()?;
        let repo = self.repo()?;
        let outcome = op(&repo);
        if let Err(e) = self.refresh() {
            log::warn!("Refresh after mutation failed: {e}");
        }
        outcome
    }

    pub fn stage_path(&self, path: &Path) -> Result<()> {
        self.mutate(|repo| repo.stage(path))
    }

    pub fn unstage_path(&self, path: &Path) -> Result<()> {
        self.mutate(|repo| repo.unstage(path))
    }

    /// Restore `path` from HEAD; returns the absolute paths that were rewritten
    pub fn discard_path(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.mutate(|repo| repo.discard(&[path.to_path_buf()]))
    }

    pub fn discard_all(&self) -> Result<Vec<PathBuf>> {
        self.mutate(|repo| repo.discard(&[]))
    }

    pub fn stage_all(&self) -> Result<()> {
        self.mutate(|repo| repo.stage_all())
    }

    pub fn unstage_all(&self) -> Result<()> {
        self.mutate(|repo| repo.unstage_all())
    }

    /// Stage one hunk of the published unstaged patch set
    pub fn stage_hunk(&self, patch_index: usize, hunk_index: usize) -> Result<HunkOutcome> {
        let patches = self.patch_set(DiffSide::Unstaged)?;
        self.mutate(|repo| {
            HunkMutator::new(repo).apply_hunk(&patches, patch_index, hunk_index, false)
        })
    }

    /// Unstage one hunk of the published staged patch set
    pub fn unstage_hunk(&self, patch_index: usize, hunk_index: usize) -> Result<HunkOutcome> {
        let patches = self.patch_set(DiffSide::Staged)?;
        self.mutate(|repo| {
            HunkMutator::new(repo).apply_hunk(&patches, patch_index, hunk_index, true)
        })
    }

    /// Revert one hunk of the published unstaged patch set in the working copy
    pub fn discard_hunk(&self, patch_index: usize, hunk_index: usize) -> Result<PathBuf> {
        let patches = self.patch_set(DiffSide::Unstaged)?;
        self.mutate(|repo| HunkMutator::new(repo).discard_hunk(&patches, patch_index, hunk_index))
    }

    pub fn commit(&self, message: &str) -> Result<git2::Oid> {
        self.mutate(|repo| repo.commit(message))
    }

    /// Focus after `mutation`, computed over the current snapshot
    pub fn get_selection_after(&self, mutation: Mutation) -> SelectionPointer {
        selection_after(&self.get_status_snapshot(), mutation)
    }

    pub fn start_log_walk(&self, limit: Option<usize>) -> Receiver<LogMessage> {
        spawn_log_walk(self.workdir.clone(), self.config.log_batch_size, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Workbench) {
        let temp_dir = TempDir::new().unwrap();
        git2::Repository::init(temp_dir.path()).unwrap();
        let workbench = Workbench::open(temp_dir.path(), WorkbenchConfig::default()).unwrap();
        (temp_dir, workbench)
    }

    #[test]
    fn test_second_mutation_is_refused() {
        let (_temp_dir, workbench) = setup();
        let _held = workbench.begin_mutation().unwrap();
        assert!(matches!(
            workbench.stage_all(),
            Err(WorkbenchError::MutationInProgress)
        ));
    }

    #[test]
    fn test_mutation_supersedes_requested_snapshot() {
        let (temp_dir, workbench) = setup();
        std::fs::write(temp_dir.path().join("a.txt"), "a\n").unwrap();

        let tick = workbench.request_snapshot();
        workbench.stage_path(Path::new("a.txt")).unwrap();

        let events = workbench.wait(Duration::from_secs(10));
        assert!(matches!(events.as_slice(), [PollEvent::Stale { tick: t }] if *t == tick));
        assert_eq!(workbench.get_status_snapshot().staged.len(), 1);
    }

    #[test]
    fn test_latest_patch_request_wins() {
        let (temp_dir, workbench) = setup();
        std::fs::write(temp_dir.path().join("a.txt"), "a\n").unwrap();

        let first = workbench.request_patch_set(DiffSide::Unstaged, None);
        let second = workbench.request_patch_set(DiffSide::Unstaged, None);
        assert!(second > first);

        let mut events = Vec::new();
        while events.len() < 2 {
            let batch = workbench.wait(Duration::from_secs(10));
            assert!(!batch.is_empty(), "worker reply timed out");
            events.extend(batch);
        }

        for event in events {
            match event {
                PollEvent::Stale { tick } => assert_eq!(tick, first),
                PollEvent::PatchSetApplied { tick, side } => {
                    assert_eq!(tick, second);
                    assert_eq!(side, DiffSide::Unstaged);
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert_eq!(workbench.patch_set(DiffSide::Unstaged).unwrap().len(), 1);
    }
}
