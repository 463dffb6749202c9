//! Platform-specific configuration and paths

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// CRM storage directory override
pub const APP_STORAGE_DIR_VAR: &str = "APP_STORAGE_DIR";
/// CRM database path override
pub const DB_PATH_VAR: &str = "DB_PATH";
/// Sales database connection URL
pub const SALES_DB_URL_VAR: &str = "PS_SALES_DB_URL";
/// Sales data directory override (takes precedence over the config file)
pub const SALES_DATA_DIR_VAR: &str = "PS_SALES_DATA_DIR";
/// Location of the Sales config file
pub const SALES_CONFIG_VAR: &str = "PS_SALES_CONFIG";

/// Path lookups captured from the process environment
///
/// Resolution works only from this snapshot, so it can be built by hand in
/// tests instead of mutating the real environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub app_storage_dir: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub sales_db_url: Option<String>,
    pub sales_data_dir: Option<PathBuf>,
    pub default_storage_dir: PathBuf,
    pub default_sales_data_dir: PathBuf,
    pub sales_config_path: PathBuf,
}

impl Environment {
    /// Capture the current process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let sales_config_path = match var(SALES_CONFIG_VAR) {
            Some(path) => expand_home(&path),
            None => sales_config_dir()?.join("config.json"),
        };

        Ok(Self {
            app_storage_dir: var(APP_STORAGE_DIR_VAR).map(PathBuf::from),
            db_path: var(DB_PATH_VAR).map(PathBuf::from),
            sales_db_url: var(SALES_DB_URL_VAR),
            sales_data_dir: var(SALES_DATA_DIR_VAR).map(|p| expand_home(&p)),
            default_storage_dir: crm_storage_dir()?,
            default_sales_data_dir: sales_data_dir()?,
            sales_config_path,
        })
    }
}

/// Sales application settings relevant to a restore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct SalesConfigFile {
    data_dir: Option<String>,
}

impl SalesConfig {
    /// Load the Sales config the way the Sales app itself does:
    /// environment override, then config file, then the platform default.
    pub fn load(env: &Environment) -> Result<Self> {
        if let Some(dir) = &env.sales_data_dir {
            return Ok(Self {
                data_dir: dir.clone(),
            });
        }

        let file = read_config_file(&env.sales_config_path)?;
        let data_dir = file
            .data_dir
            .filter(|d| !d.is_empty())
            .map(|d| expand_home(&d))
            .unwrap_or_else(|| env.default_sales_data_dir.clone());

        Ok(Self { data_dir })
    }
}

fn read_config_file(path: &Path) -> Result<SalesConfigFile> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no sales config file, using defaults");
        return Ok(SalesConfigFile::default());
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse sales config: {}", path.display()))
}

/// Get the default CRM storage directory
/// - macOS: ~/Library/Application Support/PS CRM/
/// - Linux: ~/.local/share/ps_crm/
/// - Windows: %APPDATA%/PS CRM/
pub fn crm_storage_dir() -> Result<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home
            .join("Library")
            .join("Application Support")
            .join("PS CRM"))
    }

    #[cfg(target_os = "linux")]
    {
        let data = dirs::data_dir().context("Could not determine data directory")?;
        Ok(data.join("ps_crm"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata = dirs::data_dir().context("Could not determine AppData directory")?;
        Ok(appdata.join("PS CRM"))
    }
}

/// Get the default Sales data directory
pub fn sales_data_dir() -> Result<PathBuf> {
    let data = dirs::data_dir().context("Could not determine data directory")?;
    Ok(data.join("ps_sales"))
}

/// Get the Sales config directory (~/.config/ps_sales/ on Linux)
pub fn sales_config_dir() -> Result<PathBuf> {
    let config = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config.join("ps_sales"))
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/")
            .or_else(|| path.strip_prefix("~\\"))
    };

    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
