//! Backup archive access
//!
//! A suite backup is a plain zip file:
//! ```text
//! backup.zip
//! ├── exports/ps_crm.sql   # marker, identifies the app
//! ├── database/ps_crm.db   # exported database
//! └── storage/...          # attachments, restored verbatim
//! ```

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, TimeZone};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use zip::ZipArchive;

use crate::suite::{detect_app, AppKind};

/// Subtree holding user files
pub const STORAGE_PREFIX: &str = "storage/";
/// Subtree holding the exported database
pub const DATABASE_PREFIX: &str = "database/";

/// An opened, read-only backup archive
pub struct BackupArchive {
    path: PathBuf,
    archive: ZipArchive<File>,
}

impl BackupArchive {
    /// Open a zip archive
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let archive = ZipArchive::new(file)
            .with_context(|| format!("Failed to read zip archive: {}", path.display()))?;

        tracing::debug!(path = %path.display(), entries = archive.len(), "opened backup archive");

        Ok(Self {
            path: path.to_path_buf(),
            archive,
        })
    }

    /// All entry names in archive order
    pub fn entry_names(&self) -> Vec<&str> {
        self.archive.file_names().collect()
    }

    /// Entry names starting with `prefix`, in archive order
    pub fn names_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.archive
            .file_names()
            .filter(|name| name.starts_with(prefix))
            .map(str::to_string)
            .collect()
    }

    /// Identify the app from marker entries
    pub fn detect_app(&self) -> Option<AppKind> {
        detect_app(self.entry_names())
    }

    /// Extract every entry under `output_dir`
    ///
    /// Files get the modification time recorded in the archive. Entries whose
    /// names would land outside `output_dir` are skipped. Returns the number
    /// of files written.
    pub fn extract_to(&mut self, output_dir: &Path) -> Result<usize> {
        let mut written = 0;

        for i in 0..self.archive.len() {
            let mut entry = self
                .archive
                .by_index(i)
                .with_context(|| format!("Failed to read entry {} of {}", i, self.path.display()))?;

            let Some(relative) = entry.enclosed_name() else {
                tracing::warn!(name = entry.name(), "skipping archive entry with unsafe path");
                continue;
            };
            let outpath = output_dir.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&outpath)
                    .with_context(|| format!("Failed to create: {}", outpath.display()))?;
                continue;
            }

            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create: {}", parent.display()))?;
            }

            let mut outfile = File::create(&outpath)
                .with_context(|| format!("Failed to create: {}", outpath.display()))?;
            std::io::copy(&mut entry, &mut outfile)
                .with_context(|| format!("Failed to extract: {}", entry.name()))?;

            if let Some(modified) = entry.last_modified().and_then(zip_time_to_system) {
                outfile
                    .set_modified(modified)
                    .with_context(|| format!("Failed to set mtime: {}", outpath.display()))?;
            }

            written += 1;
        }

        tracing::debug!(files = written, dir = %output_dir.display(), "extracted archive");
        Ok(written)
    }
}

/// Zip timestamps are local wall-clock times without a zone
fn zip_time_to_system(dt: zip::DateTime) -> Option<SystemTime> {
    let naive = NaiveDate::from_ymd_opt(dt.year().into(), dt.month().into(), dt.day().into())?
        .and_hms_opt(dt.hour().into(), dt.minute().into(), dt.second().into())?;
    let local = Local.from_local_datetime(&naive).earliest()?;
    Some(local.into())
}
