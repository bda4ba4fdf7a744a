use git_workbench::core::log_walk::{walk_log, LogMessage};
use git_workbench::core::patch::BINARY_PATCH_PLACEHOLDER;
use git_workbench::core::session::PollEvent;
use git_workbench::{
    Category, ChangeFlag, DiffSide, GitRepo, Mutation, SelectionPointer, WorkbenchError,
};
use std::path::Path;
use std::time::Duration;

mod common;
use common::{fixtures::*, repository::*};

#[cfg(test)]
mod snapshot_tests {
    use super::*;

    #[test]
    fn test_modified_in_index_and_worktree_lands_in_both_lists() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        create_file(&repo.path, "initial.txt", "staged edit\n")?;
        git_add(&repo.path, "initial.txt")?;
        create_file(&repo.path, "initial.txt", "worktree edit\n")?;

        let workbench = repo.workbench()?;
        let snapshot = workbench.get_status_snapshot();

        let staged = snapshot
            .find(Category::Staged, Path::new("initial.txt"))
            .expect("staged entry");
        let unstaged = snapshot
            .find(Category::Unstaged, Path::new("initial.txt"))
            .expect("unstaged entry");
        assert_eq!(staged.kind, "Modified");
        assert_eq!(staged.flag, ChangeFlag::IndexModified);
        assert_eq!(unstaged.kind, "Modified");
        assert_eq!(unstaged.flag, ChangeFlag::WtModified);
        assert!(snapshot.untracked.is_empty());
        Ok(())
    }

    #[test]
    fn test_line_stats_and_mime_class() -> anyhow::Result<()> {
        let repo = create_multi_file_repo()?;
        create_binary_file(&repo.path, "logo.png", &[0x89, b'P', b'N', b'G', 0, 0, 1])?;

        let snapshot = repo.workbench()?.get_status_snapshot();
        assert_eq!(snapshot.unstaged.len(), 3);
        assert_eq!(snapshot.untracked.len(), 3);

        let file1 = snapshot
            .find(Category::Unstaged, Path::new("file1.txt"))
            .expect("file1 entry");
        assert_eq!((file1.added_lines, file1.deleted_lines), (2, 1));
        assert_eq!(file1.mime_class, "text/plain");

        let file4 = snapshot
            .find(Category::Untracked, Path::new("file4.txt"))
            .expect("file4 entry");
        assert_eq!((file4.added_lines, file4.deleted_lines), (2, 0));

        let logo = snapshot
            .find(Category::Untracked, Path::new("logo.png"))
            .expect("logo entry");
        assert_eq!(logo.mime_class, "image/png");
        assert_eq!((logo.added_lines, logo.deleted_lines), (0, 0));
        Ok(())
    }

    #[test]
    fn test_background_snapshot_is_applied() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        let workbench = repo.workbench()?;
        assert!(workbench.get_status_snapshot().is_empty());

        create_file(&repo.path, "late.txt", "hello\n")?;
        let tick = workbench.request_snapshot();

        let events = workbench.wait(Duration::from_secs(10));
        assert!(matches!(
            events.as_slice(),
            [PollEvent::SnapshotApplied { tick: t }] if *t == tick
        ));
        assert_eq!(workbench.get_status_snapshot().untracked.len(), 1);
        Ok(())
    }

    #[test]
    fn test_superseded_snapshot_is_discarded() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        let workbench = repo.workbench()?;

        let first = workbench.request_snapshot();
        let second = workbench.request_snapshot();

        let mut events = Vec::new();
        while events.len() < 2 {
            let batch = workbench.wait(Duration::from_secs(10));
            assert!(!batch.is_empty(), "worker reply timed out");
            events.extend(batch);
        }

        let stale: Vec<u64> = events
            .iter()
            .filter_map(|event| match event {
                PollEvent::Stale { tick } => Some(*tick),
                _ => None,
            })
            .collect();
        assert_eq!(stale, vec![first]);
        assert!(events
            .iter()
            .any(|event| matches!(event, PollEvent::SnapshotApplied { tick } if *tick == second)));
        Ok(())
    }
}

#[cfg(test)]
mod path_mutation_tests {
    use super::*;

    #[test]
    fn test_unstage_file_never_committed_on_unborn_head() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        create_file(&repo.path, "new.txt", "fresh\n")?;
        let workbench = repo.workbench()?;

        workbench.stage_path(Path::new("new.txt"))?;
        assert_eq!(workbench.get_status_snapshot().staged.len(), 1);

        workbench.unstage_path(Path::new("new.txt"))?;
        let snapshot = workbench.get_status_snapshot();
        assert!(snapshot.staged.is_empty());
        assert!(snapshot.find(Category::Untracked, Path::new("new.txt")).is_some());
        Ok(())
    }

    #[test]
    fn test_unstage_file_missing_from_head() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        create_file(&repo.path, "new.txt", "fresh\n")?;
        let workbench = repo.workbench()?;

        workbench.stage_path(Path::new("new.txt"))?;
        workbench.unstage_path(Path::new("new.txt"))?;

        let snapshot = workbench.get_status_snapshot();
        assert!(snapshot.staged.is_empty());
        assert!(snapshot.find(Category::Untracked, Path::new("new.txt")).is_some());
        Ok(())
    }

    #[test]
    fn test_stage_and_unstage_all() -> anyhow::Result<()> {
        let repo = create_multi_file_repo()?;
        let workbench = repo.workbench()?;

        workbench.stage_all()?;
        let snapshot = workbench.get_status_snapshot();
        assert_eq!(snapshot.staged.len(), 5);
        assert!(snapshot.unstaged.is_empty());
        assert!(snapshot.untracked.is_empty());
        assert_eq!(
            workbench.get_selection_after(Mutation::StagedAll),
            SelectionPointer::list(Category::Staged)
        );

        workbench.unstage_all()?;
        let snapshot = workbench.get_status_snapshot();
        assert!(snapshot.staged.is_empty());
        assert_eq!(snapshot.unstaged.len(), 3);
        assert_eq!(snapshot.untracked.len(), 2);
        assert_eq!(
            workbench.get_selection_after(Mutation::UnstagedAll),
            SelectionPointer::list(Category::Unstaged)
        );
        Ok(())
    }

    #[test]
    fn test_stage_deleted_file() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        remove_file(&repo.path, "initial.txt")?;
        let workbench = repo.workbench()?;

        workbench.stage_path(Path::new("initial.txt"))?;
        let snapshot = workbench.get_status_snapshot();
        let entry = snapshot
            .find(Category::Staged, Path::new("initial.txt"))
            .expect("staged deletion");
        assert_eq!(entry.kind, "Deleted");
        Ok(())
    }

    #[test]
    fn test_selection_after_single_stage() -> anyhow::Result<()> {
        let repo = create_multi_file_repo()?;
        let workbench = repo.workbench()?;

        workbench.stage_path(Path::new("file3.txt"))?;
        assert_eq!(
            workbench.get_selection_after(Mutation::Removed {
                from: Category::Unstaged,
                index: 2,
            }),
            SelectionPointer::item(Category::Unstaged, 1)
        );
        Ok(())
    }

    #[test]
    fn test_discard_path_and_all() -> anyhow::Result<()> {
        let repo = create_multi_file_repo()?;
        let workbench = repo.workbench()?;

        let restored = workbench.discard_path(Path::new("file1.txt"))?;
        assert_eq!(restored.len(), 1);
        assert_eq!(repo.read("file1.txt")?, "content1\nline 2\n");
        assert_eq!(workbench.get_status_snapshot().unstaged.len(), 2);

        let restored = workbench.discard_all()?;
        assert_eq!(restored.len(), 2);
        let snapshot = workbench.get_status_snapshot();
        assert!(snapshot.unstaged.is_empty());
        assert_eq!(snapshot.untracked.len(), 2);
        Ok(())
    }

    #[test]
    fn test_discard_on_unborn_head_fails() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        create_file(&repo.path, "new.txt", "fresh\n")?;
        let workbench = repo.workbench()?;

        assert!(matches!(
            workbench.discard_all(),
            Err(WorkbenchError::UnbornHistory)
        ));
        assert_eq!(repo.read("new.txt")?, "fresh\n");
        Ok(())
    }

    #[test]
    fn test_commit_staged_changes() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        create_file(&repo.path, "a.txt", "one\n")?;
        let workbench = repo.workbench()?;

        workbench.stage_path(Path::new("a.txt"))?;
        workbench.commit("First commit")?;
        assert_eq!(git_log_count(&repo.path)?, 1);
        assert!(workbench.get_status_snapshot().is_empty());

        assert!(matches!(
            workbench.commit("Nothing new"),
            Err(WorkbenchError::NothingToCommit)
        ));
        Ok(())
    }
}

#[cfg(test)]
mod hunk_mutation_tests {
    use super::*;

    #[test]
    fn test_stage_then_unstage_hunk_restores_index() -> anyhow::Result<()> {
        let repo = create_single_hunk_repo()?;
        let workbench = repo.workbench()?;
        assert_eq!(git_show_index(&repo.path, "a.txt")?, "a\nb\nc\n");

        workbench.stage_hunk(0, 0)?;
        assert_eq!(git_show_index(&repo.path, "a.txt")?, "a\nx\nc\n");
        assert_eq!(repo.read("a.txt")?, "a\nx\nc\n");

        workbench.unstage_hunk(0, 0)?;
        assert_eq!(git_show_index(&repo.path, "a.txt")?, "a\nb\nc\n");
        assert_eq!(git_porcelain(&repo.path)?, " M a.txt\n");
        Ok(())
    }

    #[test]
    fn test_stage_one_of_two_hunks() -> anyhow::Result<()> {
        let repo = create_two_hunk_repo()?;
        let workbench = repo.workbench()?;
        let patches = workbench.patch_set(DiffSide::Unstaged)?;
        assert_eq!(patches.patch(0)?.hunks.len(), 2);

        workbench.stage_hunk(0, 1)?;
        assert_eq!(
            git_show_index(&repo.path, "numbers.txt")?,
            "1\n2\n3\n4\n5\n6\n7\n8\n9\nten\n"
        );
        assert_eq!(repo.read("numbers.txt")?, "one\n2\n3\n4\n5\n6\n7\n8\n9\nten\n");

        let snapshot = workbench.get_status_snapshot();
        assert!(snapshot.find(Category::Staged, Path::new("numbers.txt")).is_some());
        assert!(snapshot.find(Category::Unstaged, Path::new("numbers.txt")).is_some());
        Ok(())
    }

    #[test]
    fn test_discard_hunk_rewrites_worktree_only() -> anyhow::Result<()> {
        let repo = create_two_hunk_repo()?;
        let workbench = repo.workbench()?;

        workbench.discard_hunk(0, 0)?;
        assert_eq!(repo.read("numbers.txt")?, "1\n2\n3\n4\n5\n6\n7\n8\n9\nten\n");
        assert_eq!(git_show_index(&repo.path, "numbers.txt")?, TEN_LINES);
        Ok(())
    }

    #[test]
    fn test_crlf_file_keeps_its_line_endings() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        create_file(&repo.path, "w.txt", "a\r\nb\r\nc\r\n")?;
        git_add(&repo.path, "w.txt")?;
        git_commit(&repo.path, "Add w")?;
        create_file(&repo.path, "w.txt", "a\r\nx\r\nc\r\n")?;

        let workbench = repo.workbench()?;
        workbench.stage_hunk(0, 0)?;
        assert_eq!(git_show_index(&repo.path, "w.txt")?, "a\r\nx\r\nc\r\n");

        workbench.unstage_hunk(0, 0)?;
        assert_eq!(git_show_index(&repo.path, "w.txt")?, "a\r\nb\r\nc\r\n");
        Ok(())
    }

    #[test]
    fn test_bare_cr_inside_line_does_not_block_staging() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        create_file(&repo.path, "m.txt", "a\rb\nc\nd\n")?;
        git_add(&repo.path, "m.txt")?;
        git_commit(&repo.path, "Add m")?;
        create_file(&repo.path, "m.txt", "a\rb\nc\nD\n")?;

        let workbench = repo.workbench()?;
        workbench.stage_hunk(0, 0)?;
        assert_eq!(git_show_index(&repo.path, "m.txt")?, "a\rb\nc\nD\n");

        workbench.unstage_hunk(0, 0)?;
        assert_eq!(git_show_index(&repo.path, "m.txt")?, "a\rb\nc\nd\n");

        workbench.discard_hunk(0, 0)?;
        assert_eq!(repo.read("m.txt")?, "a\rb\nc\nd\n");
        Ok(())
    }

    #[test]
    fn test_missing_newline_at_end_of_file() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        create_file(&repo.path, "tail.txt", "a\nb")?;
        git_add(&repo.path, "tail.txt")?;
        git_commit(&repo.path, "Add tail")?;
        create_file(&repo.path, "tail.txt", "a\nb\nc")?;

        let workbench = repo.workbench()?;
        workbench.stage_hunk(0, 0)?;
        assert_eq!(git_show_index(&repo.path, "tail.txt")?, "a\nb\nc");

        workbench.unstage_hunk(0, 0)?;
        assert_eq!(git_show_index(&repo.path, "tail.txt")?, "a\nb");
        assert_eq!(repo.read("tail.txt")?, "a\nb\nc");
        Ok(())
    }

    #[test]
    fn test_stale_patch_set_fails_without_touching_index() -> anyhow::Result<()> {
        let repo = create_single_hunk_repo()?;
        let workbench = repo.workbench()?;
        workbench.patch_set(DiffSide::Unstaged)?;

        // Someone else stages the file behind the session's back
        git_add(&repo.path, "a.txt")?;

        let err = workbench.stage_hunk(0, 0).unwrap_err();
        assert!(err.is_write_error(), "unexpected error: {err}");
        assert_eq!(git_show_index(&repo.path, "a.txt")?, "a\nx\nc\n");
        Ok(())
    }

    #[test]
    fn test_binary_patch_refuses_hunk_operations() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        create_binary_file(&repo.path, "blob.bin", &[0, 1, 2, 3])?;
        git_add(&repo.path, "blob.bin")?;
        git_commit(&repo.path, "Add blob")?;
        create_binary_file(&repo.path, "blob.bin", &[0, 9, 9, 9])?;

        let workbench = repo.workbench()?;
        let patches = workbench.patch_set(DiffSide::Unstaged)?;
        let patch = patches.patch(0)?;
        assert!(patch.is_binary);
        assert_eq!(patch.display_text(), BINARY_PATCH_PLACEHOLDER);

        assert!(matches!(
            workbench.stage_hunk(0, 0),
            Err(WorkbenchError::BinaryContent { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_hunk_index_out_of_range() -> anyhow::Result<()> {
        let repo = create_single_hunk_repo()?;
        let workbench = repo.workbench()?;

        assert!(matches!(
            workbench.stage_hunk(0, 5),
            Err(WorkbenchError::HunkIndexOutOfRange { .. })
        ));
        assert!(matches!(
            workbench.stage_hunk(3, 0),
            Err(WorkbenchError::PatchIndexOutOfRange { .. })
        ));
        Ok(())
    }
}

#[cfg(test)]
mod log_walk_tests {
    use super::*;

    #[test]
    fn test_walk_in_batches_newest_first() -> anyhow::Result<()> {
        let repo = create_history_repo(5)?;
        let git_repo = GitRepo::open(&repo.path)?;

        let mut batches = Vec::new();
        let count = walk_log(&git_repo, 2, None, |batch| {
            batches.push(batch);
            true
        })?;

        assert_eq!(count, 5);
        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(batches[0][0].message, "Commit number 5");
        assert_eq!(batches[2][0].summary, "Commit number 1");
        assert_eq!(batches[0][0].author, "Test User");
        assert_eq!(batches[0][0].time.len(), "2024-01-01 00:00:00".len());
        Ok(())
    }

    #[test]
    fn test_entry_keeps_full_message() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        create_file(&repo.path, "feature.txt", "feature\n")?;
        git_add(&repo.path, "feature.txt")?;
        git_commit(&repo.path, "Add feature\n\nLonger description\n\n")?;
        let git_repo = GitRepo::open(&repo.path)?;

        let mut entries = Vec::new();
        walk_log(&git_repo, 10, Some(1), |batch| {
            entries.extend(batch);
            true
        })?;

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "Add feature\n\nLonger description");
        assert_eq!(entries[0].summary, "Add feature");
        Ok(())
    }

    #[test]
    fn test_background_walk_ends_with_done() -> anyhow::Result<()> {
        let repo = create_history_repo(3)?;
        let workbench = repo.workbench()?;

        let mut seen = 0;
        let mut finished = false;
        for message in workbench.start_log_walk(Some(2)) {
            match message {
                LogMessage::Batch(entries) => seen += entries.len(),
                LogMessage::Done => {
                    finished = true;
                    break;
                }
                LogMessage::Failed(e) => return Err(e.into()),
            }
        }
        assert!(finished);
        assert_eq!(seen, 2);
        Ok(())
    }

    #[test]
    fn test_unborn_head_yields_only_done() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        let workbench = repo.workbench()?;

        let messages: Vec<LogMessage> = workbench.start_log_walk(None).into_iter().collect();
        assert!(matches!(messages.as_slice(), [LogMessage::Done]));
        Ok(())
    }
}
