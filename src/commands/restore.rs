//! Restore command - Restore CRM or Sales data from a backup archive

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::fs;
use std::path::{Path, PathBuf};

use super::utils;
use crate::archive::{BackupArchive, DATABASE_PREFIX, STORAGE_PREFIX};
use crate::config::Environment;
use crate::error::RestoreError;
use crate::suite::{resolve_target, AppKind, RestoreTarget};

/// Options for the restore command
#[derive(Debug, Clone, Default)]
pub struct RestoreOptions {
    /// Backup zip to restore from
    pub backup: PathBuf,
    /// Skip detection and restore as this app
    pub app: Option<AppKind>,
    /// Restore into this directory instead of the app's usual one
    pub data_dir: Option<PathBuf>,
    /// Report what would happen without writing anything
    pub dry_run: bool,
}

/// What a restore did (or would do)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub app: AppKind,
    pub target: RestoreTarget,
    pub outcome: RestoreOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Dry run: archive entries that would be restored
    Planned {
        storage_entries: Vec<String>,
        database_entries: Vec<String>,
    },
    Completed {
        database: DatabaseOutcome,
        storage: StorageOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseOutcome {
    Restored {
        /// Name of the database file taken from the archive
        source: String,
        /// Copy of the database that was there before
        backup: Option<PathBuf>,
        /// Candidates that were present but not used
        ignored: Vec<String>,
    },
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageOutcome {
    Restored { files: usize },
    Skipped,
}

/// Execute the restore command against a captured environment
pub fn execute(options: &RestoreOptions, env: &Environment) -> Result<RestoreReport> {
    execute_with(options, || Ok(env.clone()))
}

/// Execute the restore command, capturing the environment only once the
/// archive and app have been validated
pub fn execute_with<F>(options: &RestoreOptions, load_env: F) -> Result<RestoreReport>
where
    F: FnOnce() -> Result<Environment>,
{
    if !options.backup.exists() {
        return Err(RestoreError::ArchiveNotFound(options.backup.clone()).into());
    }

    let mut archive = BackupArchive::open(&options.backup)?;

    let app = match options.app {
        Some(app) => app,
        None => archive.detect_app().ok_or(RestoreError::UnknownApp)?,
    };
    tracing::debug!(%app, explicit = options.app.is_some(), "resolved app");

    let env = load_env()?;
    let target = resolve_target(app, options.data_dir.as_deref(), &env)?;

    if options.dry_run {
        return Ok(plan(&archive, app, target));
    }

    // Dropping the TempDir removes the extracted tree on every return path
    let temp_dir = tempfile::tempdir().context("Failed to create temp directory")?;
    archive
        .extract_to(temp_dir.path())
        .context("Failed to extract backup")?;

    let database = restore_database(temp_dir.path(), &target.db_path)?;
    let storage = restore_storage(temp_dir.path(), &target.data_dir)?;

    Ok(RestoreReport {
        app,
        target,
        outcome: RestoreOutcome::Completed { database, storage },
    })
}

/// Dry run: list what the archive holds without touching the destination
fn plan(archive: &BackupArchive, app: AppKind, target: RestoreTarget) -> RestoreReport {
    let storage_entries = archive.names_with_prefix(STORAGE_PREFIX);
    let database_entries = archive.names_with_prefix(DATABASE_PREFIX);

    println!("{}", "(DRY-RUN MODE - no changes will be made)".blue());
    println!("App: {}", app);
    println!("Data dir: {}", target.data_dir.display());
    println!("Database path: {}", target.db_path.display());
    println!("Storage files to restore: {}", storage_entries.len());
    println!("Database files in archive: {:?}", database_entries);

    RestoreReport {
        app,
        target,
        outcome: RestoreOutcome::Planned {
            storage_entries,
            database_entries,
        },
    }
}

fn restore_database(extracted: &Path, db_path: &Path) -> Result<DatabaseOutcome> {
    let db_dir = extracted.join(DATABASE_PREFIX.trim_end_matches('/'));
    let candidates = if db_dir.is_dir() {
        utils::find_db_files(&db_dir)?
    } else {
        Vec::new()
    };

    let Some((selected, rest)) = candidates.split_first() else {
        println!(
            "{}",
            "No database file found in archive; skipping DB restore.".yellow()
        );
        return Ok(DatabaseOutcome::Skipped);
    };

    let ignored: Vec<String> = rest.iter().map(|p| file_name(p)).collect();
    if !ignored.is_empty() {
        println!(
            "{} archive has {} database files; using {}, ignoring {}",
            "Warning:".yellow(),
            candidates.len(),
            file_name(selected),
            ignored.join(", ")
        );
    }

    let backup = utils::backup_existing_db(db_path)?;
    if let Some(backup) = &backup {
        println!("Backed up existing database to {}", backup.display());
    }

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create: {}", parent.display()))?;
    }
    utils::copy_file_preserving(selected, db_path)?;
    println!("{} {}", "Restored database to".green(), db_path.display());

    Ok(DatabaseOutcome::Restored {
        source: file_name(selected),
        backup,
        ignored,
    })
}

fn restore_storage(extracted: &Path, data_dir: &Path) -> Result<StorageOutcome> {
    let storage_dir = extracted.join(STORAGE_PREFIX.trim_end_matches('/'));
    if !storage_dir.is_dir() {
        println!(
            "{}",
            "No storage directory found in archive; skipping file restore.".yellow()
        );
        return Ok(StorageOutcome::Skipped);
    }

    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create: {}", data_dir.display()))?;
    let copied = utils::copy_tree(&storage_dir, data_dir)?;
    println!(
        "{} {} storage files into {}",
        "Restored".green(),
        copied.len(),
        data_dir.display()
    );

    Ok(StorageOutcome::Restored {
        files: copied.len(),
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
