//! User-input failures that end a restore before anything is written

use std::path::PathBuf;
use thiserror::Error;

/// Errors the CLI reports with exit code 2
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("Backup archive not found: {}", .0.display())]
    ArchiveNotFound(PathBuf),

    #[error("Unable to detect app type from backup. Use --app crm|sales.")]
    UnknownApp,
}

impl RestoreError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        2
    }
}
