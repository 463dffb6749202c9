//! suite-restore library
//!
//! Restores PS Business Suites data (CRM or Sales) from a backup zip:
//! detects which app the backup belongs to, resolves where that app keeps
//! its data, backs up the current database and copies the archived
//! database and storage files into place.

pub mod archive;
pub mod commands;
pub mod config;
pub mod error;
pub mod suite;
