//! Shared file helpers for commands

use anyhow::{Context, Result};
use chrono::Local;
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Timestamp format appended to database backups
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Copy a file, keeping permissions and access/modification times
///
/// Permissions go on last so a read-only source still yields a copy with
/// the right times.
pub fn copy_file_preserving(src: &Path, dst: &Path) -> Result<()> {
    let mut reader = File::open(src).with_context(|| format!("Failed to open: {}", src.display()))?;
    let metadata = reader
        .metadata()
        .with_context(|| format!("Failed to stat: {}", src.display()))?;

    let mut writer =
        File::create(dst).with_context(|| format!("Failed to create: {}", dst.display()))?;
    io::copy(&mut reader, &mut writer)
        .with_context(|| format!("Failed to copy {} to {}", src.display(), dst.display()))?;

    let mut times = FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    writer
        .set_times(times)
        .with_context(|| format!("Failed to set times: {}", dst.display()))?;
    writer
        .set_permissions(metadata.permissions())
        .with_context(|| format!("Failed to set permissions: {}", dst.display()))?;

    Ok(())
}

/// Copy every regular file under `src` into `dst`, keeping relative paths
///
/// Symlinks and other non-regular entries are skipped. Returns the
/// destination paths written, in walk order.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();

    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk: {}", src.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("Failed to strip prefix from: {}", entry.path().display()))?;
        let target = dst.join(relative);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create: {}", parent.display()))?;
        }

        copy_file_preserving(entry.path(), &target)?;
        tracing::debug!(from = %entry.path().display(), to = %target.display(), "copied");
        copied.push(target);
    }

    Ok(copied)
}

/// Path a database backup would get at the given timestamp
///
/// `ps_crm.db` becomes `ps_crm.db.bak_20240101_120000`.
pub fn backup_path_for(db_path: &Path, timestamp: &str) -> PathBuf {
    let mut name = db_path.as_os_str().to_os_string();
    name.push(format!(".bak_{}", timestamp));
    PathBuf::from(name)
}

/// Copy an existing database aside before it gets overwritten
///
/// Returns `None` when there is nothing at `db_path`.
pub fn backup_existing_db(db_path: &Path) -> Result<Option<PathBuf>> {
    if !db_path.exists() {
        return Ok(None);
    }

    let timestamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
    let backup_path = backup_path_for(db_path, &timestamp);

    if let Some(parent) = backup_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create: {}", parent.display()))?;
    }
    copy_file_preserving(db_path, &backup_path)?;

    Ok(Some(backup_path))
}

/// Database files directly inside `dir`, sorted by name
pub fn find_db_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read: {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        let is_db = path.extension().is_some_and(|ext| ext == "db");
        if is_db && entry.file_type()?.is_file() {
            found.push(path);
        }
    }

    found.sort();
    Ok(found)
}
