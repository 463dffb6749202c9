//! App identity detection
//!
//! Every suite backup carries an SQL export under `exports/` named after the
//! app that produced it. The presence of that entry is enough to tell the
//! apps apart; its contents are never read.

use clap::ValueEnum;
use std::collections::HashSet;
use std::fmt;

/// The applications a backup can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum AppKind {
    Crm,
    Sales,
}

/// Marker checked first wins when an archive carries more than one
pub const DETECTION_ORDER: [AppKind; 2] = [AppKind::Crm, AppKind::Sales];

impl AppKind {
    /// Archive entry whose presence identifies this app
    pub fn marker(self) -> &'static str {
        match self {
            AppKind::Crm => "exports/ps_crm.sql",
            AppKind::Sales => "exports/ps_sales.sql",
        }
    }

    /// Database file name used when no override points elsewhere
    pub fn default_db_filename(self) -> &'static str {
        match self {
            AppKind::Crm => "ps_crm.db",
            AppKind::Sales => "ps_sales.db",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppKind::Crm => "crm",
            AppKind::Sales => "sales",
        }
    }
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the app from archive entry names
pub fn detect_app<'a, I>(names: I) -> Option<AppKind>
where
    I: IntoIterator<Item = &'a str>,
{
    let names: HashSet<&str> = names.into_iter().collect();
    DETECTION_ORDER
        .into_iter()
        .find(|app| names.contains(app.marker()))
}
