pub mod commit;
pub mod history;
pub mod hunks;
pub mod stage;
pub mod status;

pub use commit::*;
pub use history::*;
pub use hunks::*;
pub use stage::*;
pub use status::*;

use crate::core::{
    config::WorkbenchConfig,
    error::{Result, WorkbenchError},
    git::GitRepo,
    session::Workbench,
};
use std::env;
use std::path::{Component, Path, PathBuf};

/// Open a session on the repository containing the current directory
pub(crate) fn open_workbench() -> Result<Workbench> {
    let current_dir = env::current_dir()?;
    GitRepo::open(&current_dir).map_err(|_| WorkbenchError::NotInGitRepo)?;
    Workbench::open(&current_dir, WorkbenchConfig::load_or_default())
}

/// Turn a path given on the command line into one relative to the working tree root.
///
/// The path does not have to exist, so deleted files can be named.
pub(crate) fn repo_relative(workdir: &Path, arg: &Path) -> Result<PathBuf> {
    let absolute = if arg.is_absolute() {
        arg.to_path_buf()
    } else {
        env::current_dir()?.canonicalize()?.join(arg)
    };
    let absolute = normalize(&absolute);
    let root = workdir.canonicalize()?;

    absolute
        .strip_prefix(&root)
        .map(Path::to_path_buf)
        .map_err(|_| WorkbenchError::not_found(arg))
}

fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            other => result.push(other),
        }
    }
    result
}
