//! Destination path resolution
//!
//! Each app finds its data directory and database file differently:
//! - CRM: override, `APP_STORAGE_DIR`, platform default; database from `DB_PATH`
//!   or `<data_dir>/ps_crm.db`
//! - Sales: override, Sales config; database from `PS_SALES_DB_URL` or
//!   `<data_dir>/ps_sales.db`
//!
//! Nothing here touches the destination. Paths may not exist yet.

use anyhow::Result;
use std::path::{Path, PathBuf};

use super::app::AppKind;
use crate::config::{Environment, SalesConfig};

/// Prefix of a SQLAlchemy-style URL pointing at a local SQLite file
pub const SQLITE_URL_PREFIX: &str = "sqlite:///";

/// Where a restore writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreTarget {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
}

/// Resolve the restore target for an app
pub fn resolve_target(
    app: AppKind,
    data_dir_override: Option<&Path>,
    env: &Environment,
) -> Result<RestoreTarget> {
    match app {
        AppKind::Crm => Ok(crm_target(data_dir_override, env)),
        AppKind::Sales => sales_target(data_dir_override, env),
    }
}

fn crm_target(data_dir_override: Option<&Path>, env: &Environment) -> RestoreTarget {
    let data_dir = data_dir_override
        .map(Path::to_path_buf)
        .or_else(|| env.app_storage_dir.clone())
        .unwrap_or_else(|| env.default_storage_dir.clone());

    let db_path = env
        .db_path
        .clone()
        .unwrap_or_else(|| data_dir.join(AppKind::Crm.default_db_filename()));

    RestoreTarget { data_dir, db_path }
}

fn sales_target(data_dir_override: Option<&Path>, env: &Environment) -> Result<RestoreTarget> {
    let data_dir = match data_dir_override {
        Some(dir) => dir.to_path_buf(),
        None => SalesConfig::load(env)?.data_dir,
    };

    let db_path = match env.sales_db_url.as_deref() {
        Some(url) => db_path_from_url(url),
        None => data_dir.join(AppKind::Sales.default_db_filename()),
    };

    Ok(RestoreTarget { data_dir, db_path })
}

/// Turn a database URL into a file path
///
/// `sqlite:///relative.db` gives `relative.db`, `sqlite:////abs/x.db` gives
/// `/abs/x.db`. Anything without the prefix is taken as a plain path.
pub fn db_path_from_url(url: &str) -> PathBuf {
    PathBuf::from(url.strip_prefix(SQLITE_URL_PREFIX).unwrap_or(url))
}
