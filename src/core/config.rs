//! User configuration for status reads, diffs and log walks.
//!
//! Stored as JSON in `<config dir>/git-workbench/config.json`. A missing file means
//! defaults; missing fields fall back to their defaults too.

use crate::core::dirs::get_config_directory;
use crate::core::error::{Result, WorkbenchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct WorkbenchConfig {
    /// Commits per batch sent by the log walker
    pub log_batch_size: usize,
    /// Rename detection in status reads. Renamed-and-modified paths carry three flags
    /// and are not listed, so this is off unless asked for.
    pub detect_renames: bool,
    pub recurse_untracked_dirs: bool,
    pub context_lines: u32,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            log_batch_size: 100,
            detect_renames: false,
            recurse_untracked_dirs: true,
            context_lines: 3,
        }
    }
}

impl WorkbenchConfig {
    pub fn config_file() -> Result<PathBuf> {
        Ok(get_config_directory()?.join("config.json"))
    }

    /// Load the user's config, falling back to defaults when there is none
    pub fn load_or_default() -> Self {
        let path = match Self::config_file() {
            Ok(path) => path,
            Err(e) => {
                log::debug!("No config directory ({e}), using defaults");
                return Self::default();
            }
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring unreadable config: {e}");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| WorkbenchError::config_read_failed(path, e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| WorkbenchError::config_parse_failed(path, e))?;
        Ok(config.sanitized())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn sanitized(mut self) -> Self {
        if self.log_batch_size == 0 {
            self.log_batch_size = 1;
        }
        self
    }
}
