//! End-to-end tests for the suite-restore binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    for (name, contents) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(contents).unwrap();
    }
    zip.finish().unwrap();
}

/// Command with an isolated environment rooted in `temp`
fn cmd(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("suite-restore").unwrap();
    cmd.env_remove("APP_STORAGE_DIR")
        .env_remove("DB_PATH")
        .env_remove("PS_SALES_DB_URL")
        .env_remove("PS_SALES_DATA_DIR")
        .env_remove("RUST_LOG")
        .env("PS_SALES_CONFIG", temp.path().join("sales.json"))
        .env("HOME", temp.path().join("home"))
        .env("XDG_DATA_HOME", temp.path().join("xdg-data"))
        .env("XDG_CONFIG_HOME", temp.path().join("xdg-config"));
    cmd
}

fn list_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(dir).unwrap().to_path_buf())
        .collect();
    files.sort();
    files
}

#[test]
fn missing_archive_exits_2() {
    let temp = tempdir().unwrap();
    cmd(&temp)
        .args(["--backup"])
        .arg(temp.path().join("nope.zip"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Backup archive not found"));
}

#[test]
fn undetectable_app_exits_2_and_writes_nothing() {
    let temp = tempdir().unwrap();
    let backup = temp.path().join("backup.zip");
    let data_dir = temp.path().join("data");
    write_zip(
        &backup,
        &[("database/ps_crm.db", b"db"), ("storage/a.txt", b"a")],
    );

    cmd(&temp)
        .arg("--backup")
        .arg(&backup)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--app crm|sales"));

    assert!(!data_dir.exists());
}

#[test]
fn invalid_app_value_is_rejected() {
    let temp = tempdir().unwrap();
    cmd(&temp)
        .args(["--backup", "x.zip", "--app", "erp"])
        .assert()
        .failure();
}

#[test]
fn dry_run_reports_without_writing() {
    let temp = tempdir().unwrap();
    let backup = temp.path().join("backup.zip");
    let data_dir = temp.path().join("data");
    write_zip(
        &backup,
        &[
            ("exports/ps_crm.sql", b"--"),
            ("database/ps_crm.db", b"db"),
            ("storage/a.txt", b"a"),
            ("storage/b/c.txt", b"c"),
        ],
    );

    cmd(&temp)
        .arg("--backup")
        .arg(&backup)
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("App: crm"))
        .stdout(predicate::str::contains("Storage files to restore: 2"))
        .stdout(predicate::str::contains(
            "Database files in archive: [\"database/ps_crm.db\"]",
        ));

    assert!(!data_dir.exists());
}

#[test]
fn restores_database_and_storage() {
    let temp = tempdir().unwrap();
    let backup = temp.path().join("backup.zip");
    let data_dir = temp.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("ps_sales.db"), "old").unwrap();

    write_zip(
        &backup,
        &[
            ("exports/ps_sales.sql", b"--"),
            ("database/ps_sales.db", b"new"),
            ("storage/a/b/file.txt", b"nested"),
        ],
    );

    cmd(&temp)
        .arg("--backup")
        .arg(&backup)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Backed up existing database to"))
        .stdout(predicate::str::contains("Restored database to"))
        .stdout(predicate::str::contains("1 storage files into"));

    assert_eq!(fs::read_to_string(data_dir.join("ps_sales.db")).unwrap(), "new");
    assert_eq!(
        fs::read_to_string(data_dir.join("a/b/file.txt")).unwrap(),
        "nested"
    );

    let backups: Vec<_> = list_files(&data_dir)
        .into_iter()
        .filter(|p| p.to_string_lossy().starts_with("ps_sales.db.bak_"))
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read_to_string(data_dir.join(&backups[0])).unwrap(), "old");
}

#[test]
fn sales_db_url_sets_database_path() {
    let temp = tempdir().unwrap();
    let backup = temp.path().join("backup.zip");
    let data_dir = temp.path().join("data");
    let db_path = temp.path().join("elsewhere/sales.db");
    write_zip(
        &backup,
        &[("exports/ps_sales.sql", b"--"), ("database/x.db", b"db")],
    );

    cmd(&temp)
        .arg("--backup")
        .arg(&backup)
        .arg("--data-dir")
        .arg(&data_dir)
        .env("PS_SALES_DB_URL", format!("sqlite:///{}", db_path.display()))
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&db_path).unwrap(), "db");
}

#[test]
fn empty_archive_skips_both_and_succeeds() {
    let temp = tempdir().unwrap();
    let backup = temp.path().join("backup.zip");
    let data_dir = temp.path().join("data");
    write_zip(&backup, &[("exports/ps_crm.sql", b"--")]);

    cmd(&temp)
        .arg("--backup")
        .arg(&backup)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("skipping DB restore"))
        .stdout(predicate::str::contains("skipping file restore"));

    assert!(!data_dir.exists());
}

#[test]
fn corrupt_archive_fails_with_status_1() {
    let temp = tempdir().unwrap();
    let backup = temp.path().join("backup.zip");
    fs::write(&backup, "not a zip").unwrap();

    cmd(&temp)
        .arg("--backup")
        .arg(&backup)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read zip archive"));
}

#[cfg(unix)]
#[test]
fn extraction_dir_is_removed_on_success_and_failure() {
    let temp = tempdir().unwrap();
    let scratch = temp.path().join("scratch");
    fs::create_dir_all(&scratch).unwrap();

    let backup = temp.path().join("backup.zip");
    write_zip(
        &backup,
        &[
            ("exports/ps_crm.sql", b"--"),
            ("database/ps_crm.db", b"db"),
            ("storage/a.txt", b"a"),
        ],
    );

    let data_dir = temp.path().join("ok");
    cmd(&temp)
        .env("TMPDIR", &scratch)
        .arg("--backup")
        .arg(&backup)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();
    assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
    assert_eq!(fs::read_to_string(data_dir.join("ps_crm.db")).unwrap(), "db");

    // A directory where the database should be makes the backup step fail
    let broken_dir = temp.path().join("broken");
    fs::create_dir_all(broken_dir.join("ps_crm.db")).unwrap();
    cmd(&temp)
        .env("TMPDIR", &scratch)
        .arg("--backup")
        .arg(&backup)
        .arg("--data-dir")
        .arg(&broken_dir)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to copy"));
    assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
}

#[test]
fn short_dry_run_and_verbose_flags() {
    let temp = tempdir().unwrap();
    let backup = temp.path().join("backup.zip");
    let data_dir = temp.path().join("data");
    write_zip(
        &backup,
        &[("exports/ps_sales.sql", b"--"), ("storage/a.txt", b"a")],
    );

    cmd(&temp)
        .arg("--backup")
        .arg(&backup)
        .arg("--data-dir")
        .arg(&data_dir)
        .args(["-n", "-v"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DRY-RUN MODE"))
        .stdout(predicate::str::contains("App: sales"))
        .stderr(predicate::str::contains("DEBUG"))
        .stderr(predicate::str::contains("opened backup archive"));

    assert!(!data_dir.exists());
}
