use clap::{Parser, Subcommand};
use git_workbench::commands::*;
use git_workbench::core::{
    error::{Result, WorkbenchError},
    print_error,
};
use std::env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "git-workbench")]
#[command(about = "Stage, unstage and discard changes file by file or hunk by hunk")]
#[command(version = "0.1.0")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show staged, unstaged and untracked changes
    Status,
    /// Stage paths, or everything with --all
    Stage {
        #[arg(required_unless_present = "all")]
        paths: Vec<PathBuf>,
        #[arg(short, long, conflicts_with = "paths")]
        all: bool,
    },
    /// Unstage paths, or everything with --all
    Unstage {
        #[arg(required_unless_present = "all")]
        paths: Vec<PathBuf>,
        #[arg(short, long, conflicts_with = "paths")]
        all: bool,
    },
    /// Restore paths from HEAD, or the whole working tree when none are given
    Discard { paths: Vec<PathBuf> },
    /// List the hunks of one file
    Hunks {
        path: PathBuf,
        /// Show staged hunks instead of unstaged ones
        #[arg(long)]
        staged: bool,
    },
    /// Stage a single hunk (numbered as in `hunks`)
    StageHunk { path: PathBuf, hunk: usize },
    /// Unstage a single hunk (numbered as in `hunks --staged`)
    UnstageHunk { path: PathBuf, hunk: usize },
    /// Revert a single unstaged hunk in the working copy
    DiscardHunk { path: PathBuf, hunk: usize },
    /// Show commit history from HEAD
    Log {
        /// Stop after this many commits
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Commit the staged changes
    Commit {
        #[arg(short, long)]
        message: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configure logging based on --debug flag
    if cli.debug {
        env::set_var("RUST_LOG", "debug");
    } else {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let outcome = match cli.command {
        Commands::Status => execute_status(),
        Commands::Stage { paths, all } => execute_stage(paths, all),
        Commands::Unstage { paths, all } => execute_unstage(paths, all),
        Commands::Discard { paths } => execute_discard(paths),
        Commands::Hunks { path, staged } => execute_hunks(path, staged),
        Commands::StageHunk { path, hunk } => execute_stage_hunk(path, hunk),
        Commands::UnstageHunk { path, hunk } => execute_unstage_hunk(path, hunk),
        Commands::DiscardHunk { path, hunk } => execute_discard_hunk(path, hunk),
        Commands::Log { limit } => execute_log(limit),
        Commands::Commit { message } => execute_commit(&message),
    };

    if let Err(e) = outcome {
        if let WorkbenchError::NotInGitRepo = e {
            print_error("Not in a git repository");
        } else {
            print_error(&e.to_string());
        }
        std::process::exit(1);
    }

    Ok(())
}
