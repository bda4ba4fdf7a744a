use crate::core::error::WorkbenchError;
use std::path::PathBuf;

pub fn get_config_directory() -> Result<PathBuf, WorkbenchError> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|_| {
                dirs::home_dir()
                    .map(|home| home.join(".config"))
                    .ok_or(WorkbenchError::ConfigDirectoryNotFound)
            })?,
        "macos" => dirs::home_dir()
            .ok_or(WorkbenchError::ConfigDirectoryNotFound)?
            .join("Library/Application Support"),
        _ => dirs::config_dir().ok_or(WorkbenchError::ConfigDirectoryNotFound)?,
    };

    Ok(base.join("git-workbench"))
}
