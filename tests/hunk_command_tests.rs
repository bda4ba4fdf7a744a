use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;
use common::{assertions, fixtures::*, repository::*};

#[cfg(test)]
mod hunk_command_tests {
    use super::*;

    #[test]
    fn test_hunks_lists_numbered_hunks() -> anyhow::Result<()> {
        let repo = create_two_hunk_repo()?;

        let mut cmd = Command::cargo_bin("git-workbench")?;
        cmd.args(["hunks", "numbers.txt"])
            .current_dir(&repo.path)
            .assert()
            .success()
            .stdout(predicate::str::contains("2 hunks"))
            .stdout(assertions::has_file_index(1))
            .stdout(assertions::has_file_index(2))
            .stdout(predicate::str::contains("+one"))
            .stdout(predicate::str::contains("-10"));

        Ok(())
    }

    #[test]
    fn test_stage_hunk_then_unstage_hunk() -> anyhow::Result<()> {
        let repo = create_two_hunk_repo()?;

        let mut cmd = Command::cargo_bin("git-workbench")?;
        cmd.args(["stage-hunk", "numbers.txt", "1"])
            .current_dir(&repo.path)
            .assert()
            .success()
            .stdout(predicate::str::contains("Staged hunk 1 of numbers.txt."));

        assert_eq!(
            git_show_index(&repo.path, "numbers.txt")?,
            "one\n2\n3\n4\n5\n6\n7\n8\n9\n10\n"
        );

        let mut cmd = Command::cargo_bin("git-workbench")?;
        cmd.args(["hunks", "numbers.txt", "--staged"])
            .current_dir(&repo.path)
            .assert()
            .success()
            .stdout(predicate::str::contains("1 hunk,"));

        let mut cmd = Command::cargo_bin("git-workbench")?;
        cmd.args(["unstage-hunk", "numbers.txt", "1"])
            .current_dir(&repo.path)
            .assert()
            .success();

        assert_eq!(git_show_index(&repo.path, "numbers.txt")?, TEN_LINES);
        Ok(())
    }

    #[test]
    fn test_discard_hunk() -> anyhow::Result<()> {
        let repo = create_two_hunk_repo()?;

        let mut cmd = Command::cargo_bin("git-workbench")?;
        cmd.args(["discard-hunk", "numbers.txt", "2"])
            .current_dir(&repo.path)
            .assert()
            .success();

        assert_eq!(repo.read("numbers.txt")?, "one\n2\n3\n4\n5\n6\n7\n8\n9\n10\n");
        Ok(())
    }

    #[test]
    fn test_hunk_number_out_of_range() -> anyhow::Result<()> {
        let repo = create_single_hunk_repo()?;

        for hunk in ["0", "2"] {
            let mut cmd = Command::cargo_bin("git-workbench")?;
            cmd.args(["stage-hunk", "a.txt", hunk])
                .current_dir(&repo.path)
                .assert()
                .failure()
                .stdout(assertions::has_error());
        }

        assert_eq!(git_show_index(&repo.path, "a.txt")?, "a\nb\nc\n");
        Ok(())
    }

    #[test]
    fn test_hunks_for_binary_file() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        create_binary_file(&repo.path, "blob.bin", &[0, 1, 2])?;
        git_add(&repo.path, "blob.bin")?;
        git_commit(&repo.path, "Add blob")?;
        create_binary_file(&repo.path, "blob.bin", &[0, 7, 7])?;

        let mut cmd = Command::cargo_bin("git-workbench")?;
        cmd.args(["hunks", "blob.bin"])
            .current_dir(&repo.path)
            .assert()
            .success()
            .stdout(predicate::str::contains("Binary file"));

        Ok(())
    }
}
